//! Segment algebra for land-pattern outlines.
//!
//! All outlines produced by the pad generators are built from a handful of
//! canonical pieces (arcs and short polylines) that are mirrored, rotated,
//! reflected and translated into place, then concatenated. The operations in
//! this module are pure: every transform returns a new [`Segment`] and never
//! touches its input, so a canonical arc can be reused for any number of
//! derived pieces.
//!
//! # Ordering
//!
//! Contours are traced clockwise. Mirroring and reflecting flip the winding of
//! a piece, so those transforms also reverse the point order. A transformed
//! piece can therefore be appended to its untransformed neighbours and the
//! result is still one continuous clockwise contour.
//!
//! # Units
//!
//! Coordinates are millimetres. Tessellated arc points are rounded to
//! [`COORD_PRECISION`] so repeated runs produce identical output.

mod arc;
mod segment;

pub use arc::{arc, divisions, Arc};
pub use segment::{Point, Segment, SegmentError};

/// Minimum chord length (mm) between two consecutive points on an arc.
///
/// The step angle of an arc of radius `r` is about `ARC_RES / r`, so large
/// radii get proportionally more points and the chordal deviation stays
/// bounded for every radius.
pub const ARC_RES: f64 = 0.02;

/// Coordinate resolution of tessellated points (mm).
pub const COORD_PRECISION: f64 = 1e-4;

/// Rounds a coordinate to [`COORD_PRECISION`].
#[must_use]
pub fn round_coord(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_coord_keeps_four_decimals() {
        assert!((round_coord(0.018_541) - 0.0185).abs() < f64::EPSILON);
        assert!((round_coord(-0.057_063) + 0.0571).abs() < f64::EPSILON);
        assert!((round_coord(1.0) - 1.0).abs() < f64::EPSILON);
    }
}
