//! D-shape terminal pad.
//!
//! The pad is a stadium-like outline: a half-circle at the outer (heel) end
//! and, at the inner (toe) end, two rounded corners or a flat edge when there
//! is no toe extension. A pad shorter than its half width gets two quarter
//! circles and a straight outer edge instead of the half-circle. The
//! solder-mask opening and paste aperture are the same outline grown or
//! shrunk by a delta, so `mask ⊇ pad ⊇ paste`. Where the shrunk toe edge
//! passes the heel centre it cuts the heel rounding.
//!
//! ```text
//!        toe                    heel
//!   (-toe, T) ╭─────────────────╮
//!             │                  )  <- right arc, radius T, centre (cx, 0)
//!  (-toe, -T) ╰─────────────────╯
//!             ^ x = 0 (terminal inner edge)
//! ```

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use super::props::PropertyBag;
use crate::geometry::{arc, divisions, Point, Segment};

/// Largest corner radius at the toe end (mm).
pub const MAX_PAD_RAD: f64 = 0.25;

/// Smallest paste corner radius (mm).
pub const MIN_RAD: f64 = 0.06;

const MIN_TERM: f64 = 0.1;
const MAX_TERM: f64 = 10.0;
const MAX_FILLET: f64 = 2.0;
const MAX_MASK_SWELL: f64 = 1.0;
const MAX_PASTE_SHRINK: f64 = 0.5;

/// D-shape pad parameters (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DShapeProps {
    /// Terminal length.
    pub term_length: f64,
    /// Terminal width.
    pub term_width: f64,
    /// Toe extension (JT).
    pub pad_toe: f64,
    /// Heel extension (JH).
    pub pad_heel: f64,
    /// Side reduction (JS), subtracted from the half width.
    pub pad_side: f64,
    /// Solder-mask swell.
    pub mask_swell: f64,
    /// Paste-aperture shrink.
    pub paste_shrink: f64,
}

impl Default for DShapeProps {
    fn default() -> Self {
        Self {
            term_length: 0.55,
            term_width: 0.24,
            pad_toe: 0.4,
            pad_heel: 0.05,
            pad_side: 0.0,
            mask_swell: 0.08,
            paste_shrink: 0.08,
        }
    }
}

impl DShapeProps {
    /// Half of the pad width: `termWidth / 2 - padSide`.
    #[must_use]
    pub fn half_width(&self) -> f64 {
        self.term_width / 2.0 - self.pad_side
    }

    /// X coordinate of the outer end: `termLength + padHeel`.
    #[must_use]
    pub fn right_edge(&self) -> f64 {
        self.term_length + self.pad_heel
    }

    /// Radius of the heel rounding.
    ///
    /// The half width, unless the pad is shorter than that. A short pad gets
    /// two quarter circles joined by a straight outer edge.
    #[must_use]
    pub fn heel_radius(&self) -> f64 {
        self.half_width().min(self.right_edge())
    }

    /// Largest paste shrink that still leaves an aperture.
    fn max_paste_shrink(&self) -> f64 {
        MAX_PASTE_SHRINK
            .min(self.heel_radius() - 0.01)
            .min((self.right_edge() + self.pad_toe) / 2.0 - 0.01)
    }
}

/// The three outlines of a D-shape pad.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DShapeOutlines {
    /// Copper outline.
    pub pad: Segment,
    /// Solder-mask opening.
    pub solder_mask: Segment,
    /// Paste aperture.
    pub paste_mask: Segment,
}

/// D-shape pad generator.
#[derive(Debug, Clone, Default)]
pub struct DShapePad {
    props: DShapeProps,
}

impl DShapePad {
    /// Creates a generator with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current validated parameters.
    #[must_use]
    pub const fn props(&self) -> &DShapeProps {
        &self.props
    }

    /// Applies a partial update and returns the validated parameters.
    ///
    /// Absent or non-numeric fields keep their previous value. All values
    /// (including retained ones) are clamped against the current bounds.
    pub fn set_props(&mut self, update: &Value) -> DShapeProps {
        let bag = PropertyBag::new(update);
        let p = &mut self.props;

        p.term_length = bag.bounded("termLength", p.term_length, MIN_TERM, MAX_TERM, 0.01);
        p.term_width = bag.bounded("termWidth", p.term_width, MIN_TERM, MAX_TERM, 0.01);
        p.pad_toe = bag.bounded("padToe", p.pad_toe, 0.0, MAX_FILLET, 0.001);
        p.pad_heel = bag.bounded("padHeel", p.pad_heel, 0.0, MAX_FILLET, 0.001);
        p.pad_side = bag.bounded("padSide", p.pad_side, 0.0, p.term_width / 4.0, 0.001);
        p.mask_swell = bag.bounded("maskSwell", p.mask_swell, 0.0, MAX_MASK_SWELL, 0.001);
        let max_shrink = p.max_paste_shrink();
        p.paste_shrink = bag.bounded("pasteShrink", p.paste_shrink, 0.0, max_shrink, 0.001);

        trace!(props = ?self.props, "D-shape pad props updated");
        self.props
    }

    /// Builds the pad, solder-mask and paste outlines.
    #[must_use]
    pub fn outlines(&self) -> DShapeOutlines {
        DShapeOutlines {
            pad: self.build_outline(0.0),
            solder_mask: self.build_outline(self.props.mask_swell),
            paste_mask: self.build_outline(-self.props.paste_shrink),
        }
    }

    /// Copper outline.
    #[must_use]
    pub fn pad(&self) -> Segment {
        self.build_outline(0.0)
    }

    /// Solder-mask opening.
    #[must_use]
    pub fn solder_mask(&self) -> Segment {
        self.build_outline(self.props.mask_swell)
    }

    /// Paste aperture.
    #[must_use]
    pub fn paste_mask(&self) -> Segment {
        self.build_outline(-self.props.paste_shrink)
    }

    /// Outline grown by `delta` (positive) or shrunk by `-delta` (negative).
    ///
    /// Starts at the top of the heel and runs clockwise.
    fn build_outline(&self, delta: f64) -> Segment {
        let p = &self.props;
        let top = p.half_width();
        let left = p.pad_toe;

        let radius = p.heel_radius();
        let cx = p.right_edge() - radius;
        let heel = if radius < top {
            let cy = top - radius;
            quarter_arc(Point::new(cx, cy), radius + delta, FRAC_PI_2)
                .concat(&quarter_arc(Point::new(cx, -cy), radius + delta, 0.0))
        } else {
            right_arc(Point::new(cx, 0.0), top + delta)
        };

        if delta >= 0.0 {
            if left <= 0.0 {
                // No toe: flat inner edge at x = -delta.
                let edge = Segment::from_pairs(&[(-delta, -(top + delta)), (-delta, top + delta)]);
                return heel.concat(&edge);
            }
            let r1 = (top * 0.5).min(MAX_PAD_RAD).min(left);
            let corner = quarter_arc(Point::new(-(left - r1), -(top - r1)), r1 + delta, -FRAC_PI_2);
            return heel.concat(&corner).concat(&corner.mirror_v());
        }

        let t = top + delta;
        let l = left + delta;
        if left > 0.0 {
            // the corner must start left of the heel centre
            let r2 = (t * 0.5).max(MIN_RAD).min(cx + l);
            if r2 > 0.0 && t > r2 {
                let corner = quarter_arc(Point::new(-l + r2, -t + r2), r2, -FRAC_PI_2);
                return heel.concat(&corner).concat(&corner.mirror_v());
            }
        }
        if -l <= cx {
            heel.concat(&Segment::from_pairs(&[(-l, -t), (-l, t)]))
        } else {
            // toe edge right of the heel centre cuts the heel rounding
            heel.clip_from(-l, |q| q.x)
        }
    }
}

/// Half circle from the top (`π/2`) clockwise to the bottom (`-π/2`).
fn right_arc(center: Point, radius: f64) -> Segment {
    let division = divisions(PI, radius);
    #[allow(clippy::cast_precision_loss)]
    let step = PI / division as f64;
    arc(center, radius, FRAC_PI_2, -step, division + 1)
}

/// Quarter circle clockwise from `start`.
fn quarter_arc(center: Point, radius: f64, start: f64) -> Segment {
    let division = divisions(FRAC_PI_2, radius);
    #[allow(clippy::cast_precision_loss)]
    let step = FRAC_PI_2 / division as f64;
    arc(center, radius, start, -step, division + 1)
}
