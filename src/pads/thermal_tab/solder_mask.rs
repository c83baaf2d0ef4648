//! Solder-mask openings for the thermal tab.
//!
//! Without tenting the opening is the pad rectangle grown by the mask swell.
//! With tenting every via keeps a ring of mask, so the opening is split into
//! horizontal strips whose long edges are scalloped around the via rings:
//!
//! ```text
//!   ┌─────────────┐   top strip
//!   └─◠───◠───◠───┘
//!   ┌─◡───◡───◡───┐   one middle strip per gap between via rows
//!   └─◠───◠───◠───┘
//!   ┌─◡───◡───◡───┐   bottom strip
//!   └─────────────┘
//! ```
//!
//! Every contour starts at its top-right corner and runs clockwise.

use std::f64::consts::PI;

use super::{ThermalTabProps, ViaGrid};
use crate::geometry::{arc, divisions, Point, Segment};

/// Builds the solder-mask openings.
#[must_use]
pub fn solder_masks(props: &ThermalTabProps, grid: &ViaGrid) -> Vec<Segment> {
    let right = props.pad_length / 2.0 + props.mask_swell;
    let top = props.pad_width / 2.0 + props.mask_swell;

    if !props.via_tenting {
        return vec![Segment::from_pairs(&[
            (right, top),
            (right, -top),
            (-right, -top),
            (-right, top),
        ])];
    }

    let scallops = via_row_scallops(props, grid);
    let via_y = grid.origin.y;

    let top_strip = Segment::join(&[
        Segment::from_pairs(&[(right, top), (right, via_y)]),
        scallops.translate(0.0, via_y),
        Segment::from_pairs(&[(-right, via_y), (-right, top)]),
    ]);
    let bottom_strip = top_strip.mirror_v();
    let mut masks = vec![top_strip, bottom_strip];

    if grid.rows > 1 {
        let pitch = props.via_pitch_v;
        let middle = Segment::join(&[
            Segment::from_pairs(&[(right, pitch), (right, 0.0)]),
            scallops.clone(),
            Segment::from_pairs(&[(-right, 0.0), (-right, pitch)]),
            scallops.mirror_v().translate(0.0, pitch),
        ]);
        masks.extend((1..grid.rows).map(|j| {
            #[allow(clippy::cast_precision_loss)]
            let dy = (j as f64).mul_add(-pitch, via_y);
            middle.translate(0.0, dy)
        }));
    }
    masks
}

/// One row of upper half-circles around the via rings, right to left, at y = 0.
fn via_row_scallops(props: &ThermalTabProps, grid: &ViaGrid) -> Segment {
    let radius = props.via_diameter / 2.0 + props.via_ring_width;
    let division = divisions(PI, radius);
    #[allow(clippy::cast_precision_loss)]
    let step = PI / division as f64;
    let half_circle = arc(Point::default(), radius, 0.0, step, division + 1);

    let pieces: Vec<Segment> = (0..grid.columns)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let cx = (i as f64).mul_add(-props.via_pitch_h, grid.origin.x);
            half_circle.translate(cx, 0.0)
        })
        .collect();
    Segment::join(&pieces)
}
