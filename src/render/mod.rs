//! SVG path data for segments.
//!
//! Screen space has y pointing down, so every y coordinate is negated.
//! Multi-contour openings are emitted as one composite path and must be
//! drawn with `fill-rule="evenodd"` so inner contours become holes.

use std::fmt::Write;

use crate::geometry::Segment;

/// Path data for one closed contour: `M x -y L x -y ... z`.
///
/// Returns an empty string for an empty segment.
#[must_use]
pub fn path_data(segment: &Segment) -> String {
    let mut points = segment.points().iter();
    let Some(first) = points.next() else {
        return String::new();
    };
    let mut d = format!("M{} {} L", num(first.x), num(-first.y));
    for p in points {
        // Writing to a String cannot fail.
        let _ = write!(d, " {} {}", num(p.x), num(-p.y));
    }
    d.push('z');
    d
}

/// Concatenated path data for several contours.
#[must_use]
pub fn composite_path_data(segments: &[Segment]) -> String {
    segments.iter().map(path_data).collect()
}

/// Normalises negative zero (`-0 + 0 == +0`) so output is stable.
fn num(v: f64) -> f64 {
    v + 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flips_y_and_closes() {
        let s = Segment::from_pairs(&[(1.0, 2.0), (3.5, -4.0), (0.0, 0.0)]);
        assert_eq!(path_data(&s), "M1 -2 L 3.5 4 0 0z");
    }

    #[test]
    fn empty_segment_gives_empty_path() {
        assert_eq!(path_data(&Segment::default()), "");
    }

    #[test]
    fn composite_joins_subpaths() {
        let a = Segment::from_pairs(&[(0.0, 1.0), (1.0, 0.0)]);
        let b = a.rotate_180();
        assert_eq!(composite_path_data(&[a, b]), "M0 -1 L 1 0zM0 1 L -1 0z");
    }
}
