//! Arc tessellation.

use super::{round_coord, Point, Segment, ARC_RES};

/// Arc descriptor: a fan of `steps` points at `radius` from `center`,
/// starting at `start` and advancing by `step` radians per point.
///
/// Positive `step` runs counter-clockwise, negative `step` clockwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    /// Arc centre.
    pub center: Point,
    /// Radius (mm).
    pub radius: f64,
    /// Angle of the first point (radians).
    pub start: f64,
    /// Angle increment between points (radians).
    pub step: f64,
    /// Number of points to emit.
    pub steps: usize,
}

impl Arc {
    /// Arc sweeping from `start` to `end` with the step angle derived from
    /// [`ARC_RES`]. Includes both end points.
    #[must_use]
    pub fn sweep(center: Point, radius: f64, start: f64, end: f64) -> Self {
        let sweep = end - start;
        let division = divisions(sweep, radius);
        #[allow(clippy::cast_precision_loss)]
        let step = sweep / division as f64;
        Self {
            center,
            radius,
            start,
            step,
            steps: division + 1,
        }
    }

    /// Same arc without its final point, so that it can be followed by a
    /// piece starting exactly where this one would have ended.
    #[must_use]
    pub const fn open_end(self) -> Self {
        Self {
            steps: self.steps.saturating_sub(1),
            ..self
        }
    }

    /// Tessellates the arc into a segment.
    #[must_use]
    pub fn tessellate(&self) -> Segment {
        arc(self.center, self.radius, self.start, self.step, self.steps)
    }
}

/// Returns `steps` points on a circle, each coordinate rounded to
/// [`super::COORD_PRECISION`].
#[must_use]
pub fn arc(center: Point, radius: f64, start: f64, step: f64, steps: usize) -> Segment {
    (0..steps)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let alpha = (i as f64).mul_add(step, start);
            Point::new(
                round_coord(radius.mul_add(alpha.cos(), center.x)),
                round_coord(radius.mul_add(alpha.sin(), center.y)),
            )
        })
        .collect()
}

/// Number of chord divisions for an arc of `sweep` radians at `radius`.
///
/// The magnitude of `floor(sweep * radius / ARC_RES)`, never less than one so
/// the step angle stays finite for tiny or zero radii.
#[must_use]
pub fn divisions(sweep: f64, radius: f64) -> usize {
    let raw = (sweep * radius / ARC_RES).floor().abs();
    if raw.is_finite() && raw >= 1.0 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let n = raw as usize;
        n
    } else {
        1
    }
}
