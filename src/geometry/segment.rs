//! Points, segments and the rigid transforms used to assemble outlines.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A 2D point (mm).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate (mm).
    pub x: f64,
    /// Y coordinate (mm).
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns `true` when both coordinates are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Errors raised when decoding a flat coordinate sequence.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SegmentError {
    /// The sequence does not hold X/Y pairs.
    #[error("coordinate sequence has odd length {len}")]
    OddLength {
        /// Length of the rejected sequence.
        len: usize,
    },
}

/// An ordered run of points forming (part of) a clockwise contour.
///
/// A closed contour is never explicitly closed: the edge from the last point
/// back to the first is implied. On the wire a segment is a flat sequence of
/// alternating X and Y values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Segment {
    points: Vec<Point>,
}

impl Segment {
    /// Creates a segment from points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Creates a segment from `(x, y)` pairs.
    #[must_use]
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        pairs.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    /// Concatenates pieces into one segment, in order.
    #[must_use]
    pub fn join<'a, I>(pieces: I) -> Self
    where
        I: IntoIterator<Item = &'a Self>,
    {
        pieces
            .into_iter()
            .flat_map(|piece| piece.points.iter().copied())
            .collect()
    }

    /// Returns this segment followed by `other`.
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        Self::join([self, other])
    }

    /// Returns the points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the segment has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First point, if any.
    #[must_use]
    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    /// Last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Flat `[x1, y1, x2, y2, ...]` coordinate sequence.
    #[must_use]
    pub fn to_coords(&self) -> Vec<f64> {
        self.points.iter().flat_map(|p| [p.x, p.y]).collect()
    }

    /// Returns `true` when every coordinate is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.points.iter().all(Point::is_finite)
    }

    /// Drops the first `n` points.
    #[must_use]
    pub fn skip_first(&self, n: usize) -> Self {
        Self::new(self.points.iter().skip(n).copied().collect())
    }

    /// Drops the last `n` points.
    #[must_use]
    pub fn skip_last(&self, n: usize) -> Self {
        let keep = self.points.len().saturating_sub(n);
        Self::new(self.points[..keep].to_vec())
    }

    /// Mirrors across the Y axis: `[x1, y1, .., xn, yn]` becomes
    /// `[-xn, yn, .., -x1, y1]`.
    #[must_use]
    pub fn mirror_h(&self) -> Self {
        self.points
            .iter()
            .rev()
            .map(|p| Point::new(-p.x, p.y))
            .collect()
    }

    /// Mirrors across the X axis: `[x1, y1, .., xn, yn]` becomes
    /// `[xn, -yn, .., x1, -y1]`.
    #[must_use]
    pub fn mirror_v(&self) -> Self {
        self.points
            .iter()
            .rev()
            .map(|p| Point::new(p.x, -p.y))
            .collect()
    }

    /// Rotates by 180 degrees about the origin. Order is preserved.
    #[must_use]
    pub fn rotate_180(&self) -> Self {
        self.points.iter().map(|p| Point::new(-p.x, -p.y)).collect()
    }

    /// Reflects across the line `y = x`: `[x1, y1, .., xn, yn]` becomes
    /// `[yn, xn, .., y1, x1]`.
    #[must_use]
    pub fn reflect_45(&self) -> Self {
        self.points.iter().rev().map(|p| Point::new(p.y, p.x)).collect()
    }

    /// Offsets every point by `(dx, dy)`.
    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        self.points
            .iter()
            .map(|p| Point::new(p.x + dx, p.y + dy))
            .collect()
    }

    /// Keeps the points where `coord(p) >= limit`, adding a point wherever
    /// the run crosses the limit.
    #[must_use]
    pub fn clip_from(&self, limit: f64, coord: impl Fn(Point) -> f64) -> Self {
        let mut kept = Vec::with_capacity(self.points.len() + 1);
        let mut prev: Option<Point> = None;
        for &p in &self.points {
            if let Some(a) = prev {
                let (ca, cp) = (coord(a), coord(p));
                if (ca < limit) != (cp < limit) {
                    let t = (limit - ca) / (cp - ca);
                    kept.push(Point::new(t.mul_add(p.x - a.x, a.x), t.mul_add(p.y - a.y, a.y)));
                }
            }
            if coord(p) >= limit {
                kept.push(p);
            }
            prev = Some(p);
        }
        Self::new(kept)
    }

    /// Unsigned polygon area (shoelace formula).
    ///
    /// The closing edge from the last point back to the first is implied.
    #[must_use]
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let twice: f64 = (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                a.x.mul_add(b.y, -(a.y * b.x))
            })
            .sum();
        (twice / 2.0).abs()
    }
}

impl FromIterator<Point> for Segment {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl TryFrom<Vec<f64>> for Segment {
    type Error = SegmentError;

    fn try_from(coords: Vec<f64>) -> Result<Self, Self::Error> {
        if coords.len() % 2 != 0 {
            return Err(SegmentError::OddLength { len: coords.len() });
        }
        Ok(coords
            .chunks_exact(2)
            .map(|xy| Point::new(xy[0], xy[1]))
            .collect())
    }
}

impl From<Segment> for Vec<f64> {
    fn from(segment: Segment) -> Self {
        segment.to_coords()
    }
}
