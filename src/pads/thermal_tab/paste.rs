//! Paste stencil mosaic for the thermal tab.
//!
//! Between four neighbouring vias the stencil opening is a tile bounded by
//! four "bows": each bow is the via keep-out arc (the main arc) with a small
//! rounded tip (the minor arc, radius [`CORNER_RAD`]) at each end, placed so
//! that neighbouring tiles are exactly `pasteSpacing` apart.
//!
//! ```text
//!        tip ╮
//!             ╲___ main arc around the via at the origin
//!                 ╲
//!                  ╰ tip
//! ```
//!
//! The north-east bow is computed once and mirrored into the other three
//! quadrants. Four tile templates are built from bows and rounded corners,
//! all relative to the top-right via:
//!
//! 1. corner tile (two pad edges)
//! 2. top row tile (one horizontal pad edge)
//! 3. interior tile (no pad edge)
//! 4. right column tile (one vertical pad edge)
//!
//! In the dense layout the vias sit so close to the pad edge that the edge
//! cuts the keep-out circle, so tiles 1, 2 and 4 use truncated bows and each
//! of them also covers the first interior cell.

use std::f64::consts::{FRAC_PI_2, PI};

use serde::Serialize;
use tracing::debug;

use super::{ThermalTabProps, ViaGrid, CORNER_RAD};
use crate::geometry::{arc, Arc, Point, Segment};

/// Radius of the bow tips and rounded tile corners.
const MINOR: f64 = CORNER_RAD;

/// Tessellated corners closer than this to a neighbouring bow lose the
/// overlapping end point (x of the second point of the corner arc).
const CORNER_OVERLAP: f64 = 0.0185;

/// The four paste tile templates, positioned relative to the top-right via.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "Vec<Segment>")]
pub struct PasteTemplates {
    /// Tile in the top-right corner.
    pub corner: Segment,
    /// Tile along the top edge.
    pub edge_row: Segment,
    /// Tile between four vias.
    pub interior: Segment,
    /// Tile along the right edge.
    pub edge_column: Segment,
}

impl PasteTemplates {
    /// Templates in corner, row, interior, column order.
    #[must_use]
    pub const fn as_array(&self) -> [&Segment; 4] {
        [&self.corner, &self.edge_row, &self.interior, &self.edge_column]
    }

    /// Number of templates.
    #[must_use]
    pub const fn len(&self) -> usize {
        4
    }

    /// Always `false`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

impl From<PasteTemplates> for Vec<Segment> {
    fn from(t: PasteTemplates) -> Self {
        vec![t.corner, t.edge_row, t.interior, t.edge_column]
    }
}

/// Bow pieces around a via at the origin.
struct Bows {
    /// Tip at the lower end of the north-east bow.
    tip: Segment,
    /// Tip at the upper end of the north-east bow.
    tip_reflected: Segment,
    ne: Segment,
    nw: Segment,
    sw: Segment,
    se: Segment,
    theta: f64,
}

/// Builds templates and the placed mosaic for one parameter set.
#[derive(Debug, Clone)]
pub struct PasteBuilder {
    right_edge: f64,
    top_edge: f64,
    main: f64,
    spacing: f64,
    pitch_h: f64,
    pitch_v: f64,
    origin: Point,
    columns: usize,
    rows: usize,
    dense: bool,
}

impl PasteBuilder {
    /// Captures the values the paste layer depends on.
    #[must_use]
    pub fn new(props: &ThermalTabProps, grid: &ViaGrid) -> Self {
        Self {
            right_edge: props.pad_length / 2.0 - grid.origin.x - props.paste_shrink,
            top_edge: props.pad_width / 2.0 - grid.origin.y - props.paste_shrink,
            main: props.via_keepout_radius() + props.paste_shrink,
            spacing: props.paste_spacing,
            pitch_h: props.via_pitch_h,
            pitch_v: props.via_pitch_v,
            origin: grid.origin,
            columns: grid.columns,
            rows: grid.rows,
            dense: grid.is_dense(),
        }
    }

    fn hypotenuse(&self) -> f64 {
        MINOR + self.main
    }

    /// Main arc around the via, both ends included.
    fn bow_mid(&self, start: f64, end: f64) -> Segment {
        Arc::sweep(Point::default(), self.main, start, end).tessellate()
    }

    /// Bow tip, last point dropped so it does not repeat the next piece.
    fn bow_tip(start: f64, end: f64, center: Point) -> Segment {
        Arc::sweep(center, MINOR, start, end).open_end().tessellate()
    }

    /// Quarter circle of radius [`MINOR`], clockwise from 90° to 0°.
    fn corner() -> Segment {
        arc(Point::default(), MINOR, FRAC_PI_2, -PI / 10.0, 6)
    }

    fn bows(&self) -> Bows {
        let hypo = self.hypotenuse();
        let oppo = MINOR + self.spacing / 2.0;
        let theta = asin_clamped(oppo / hypo);
        let tip_center = Point::new(theta.cos() * hypo, oppo);

        let tip = Self::bow_tip(-FRAC_PI_2, -PI + theta, tip_center);
        let tip_reflected = tip.reflect_45();
        let ne = Segment::join(&[
            tip.clone(),
            self.bow_mid(theta, FRAC_PI_2 - theta),
            tip_reflected.clone(),
        ]);
        Bows {
            nw: ne.mirror_h(),
            sw: ne.rotate_180(),
            se: ne.mirror_v(),
            ne,
            tip,
            tip_reflected,
            theta,
        }
    }

    /// Builds the four templates.
    #[must_use]
    pub fn templates(&self) -> PasteTemplates {
        let bows = self.bows();
        let interior = Segment::join(&[
            bows.sw.clone(),
            bows.nw.translate(0.0, -self.pitch_v),
            bows.ne.translate(-self.pitch_h, -self.pitch_v),
            bows.se.translate(-self.pitch_h, 0.0),
        ]);
        if self.dense {
            self.dense_templates(&bows, interior)
        } else {
            self.grid_templates(&bows, interior)
        }
    }

    fn grid_templates(&self, bows: &Bows, interior: Segment) -> PasteTemplates {
        let corner_ne = Self::corner();
        let corner_nw = corner_ne.mirror_h();
        let corner_se = corner_ne.mirror_v();

        let edge_x = self.right_edge - MINOR;
        let edge_y = self.top_edge - MINOR;
        let gap = self.spacing / 2.0 + MINOR;

        // A rounded corner must not sit inside the bow tip it joins. On a
        // collapsed grid the pad edge can be that close to the via, and the
        // tile is dropped instead of folding over the pad edge.
        let reach = gap.max(bows.theta.cos() * self.hypotenuse()) - 1e-9;
        let fits_x = edge_x >= reach;
        let fits_y = edge_y >= reach;
        if !(fits_x && fits_y) {
            debug!(edge_x, edge_y, reach, "pad edge too close to the vias, paste tiles dropped");
        }

        let corner = if fits_x && fits_y {
            Segment::join(&[
                corner_ne.translate(edge_x, edge_y),
                corner_se.translate(edge_x, gap),
                bows.ne.clone(),
                corner_nw.translate(gap, edge_y),
            ])
        } else {
            Segment::default()
        };
        let edge_row = if fits_y {
            Segment::join(&[
                corner_ne.translate(-gap, edge_y),
                bows.nw.clone(),
                bows.ne.translate(-self.pitch_h, 0.0),
                corner_nw.translate(gap - self.pitch_h, edge_y),
            ])
        } else {
            Segment::default()
        };
        let edge_column = if fits_x {
            Segment::join(&[
                corner_ne.translate(edge_x, -gap),
                corner_se.translate(edge_x, gap - self.pitch_v),
                bows.ne.translate(0.0, -self.pitch_v),
                bows.se.clone(),
            ])
        } else {
            Segment::default()
        };

        PasteTemplates {
            corner,
            edge_row,
            interior,
            edge_column,
        }
    }

    fn dense_templates(&self, bows: &Bows, interior: Segment) -> PasteTemplates {
        let hypo = self.hypotenuse();
        let corner_ne = Self::corner();

        // Piece where the right pad edge meets the keep-out below the via.
        let (alpha, arc_right) = if self.right_edge >= MINOR {
            let cx = self.right_edge - MINOR;
            let cy = -self.main - MINOR;
            let piece = if cx < CORNER_OVERLAP {
                corner_ne.skip_first(1)
            } else {
                corner_ne.clone()
            };
            (0.0, piece.translate(cx, cy))
        } else {
            let oppo = self.right_edge - MINOR;
            let alpha = -asin_clamped(oppo / hypo);
            let center = Point::new(oppo, -(alpha.cos() * hypo));
            (alpha, Self::bow_tip(FRAC_PI_2 - alpha, 0.0, center))
        };

        // Piece where the top pad edge meets the keep-out left of the via.
        let (beta, arc_top) = if self.top_edge >= MINOR {
            let cy = self.top_edge - MINOR;
            let cx = -self.main - MINOR;
            let piece = if cy < CORNER_OVERLAP {
                corner_ne.skip_last(1)
            } else {
                corner_ne
            };
            (0.0, piece.translate(cx, cy))
        } else {
            let oppo = self.top_edge - MINOR;
            let beta = -asin_clamped(oppo / hypo);
            let center = Point::new(-(beta.cos() * hypo), oppo);
            (beta, Self::bow_tip(FRAC_PI_2, beta, center))
        };

        // Closer than two tip radii, the pieces of neighbouring vias cross
        // halfway between them.
        let arc_top = arc_top.clip_from(-self.pitch_h / 2.0, |p| p.x);
        let arc_right = arc_right.clip_from(-self.pitch_v / 2.0, |p| p.y);

        let theta = bows.theta;
        let right = Segment::join(&[
            bows.tip.rotate_180(),
            self.bow_mid(PI + theta, 1.5f64.mul_add(PI, -alpha)),
            arc_right.clone(),
        ]);
        let right_below = right.mirror_v().translate(0.0, -self.pitch_v);
        let top = Segment::join(&[
            arc_top.clone(),
            self.bow_mid(PI + beta, 1.5f64.mul_add(PI, -theta)),
            bows.tip_reflected.rotate_180(),
        ]);
        let top_left = top.mirror_h().translate(-self.pitch_h, 0.0);
        let top_right = Segment::join(&[
            arc_top,
            self.bow_mid(PI + beta, 1.5f64.mul_add(PI, -alpha)),
            arc_right,
        ]);
        let ne_diagonal = bows.ne.translate(-self.pitch_h, -self.pitch_v);

        PasteTemplates {
            corner: Segment::join(&[
                top_right,
                right_below.clone(),
                ne_diagonal.clone(),
                top_left.clone(),
            ]),
            edge_row: Segment::join(&[
                top,
                bows.nw.translate(0.0, -self.pitch_v),
                ne_diagonal.clone(),
                top_left,
            ]),
            interior,
            edge_column: Segment::join(&[
                right,
                right_below,
                ne_diagonal,
                bows.se.translate(-self.pitch_h, 0.0),
            ]),
        }
    }

    /// Places the templates over the whole pad.
    ///
    /// The corner tile is mirrored into all four corners, the row and column
    /// tiles are stepped along the edges (and mirrored to the opposite edge),
    /// and the interior tile fills the remaining cells. Dropped (empty)
    /// templates place nothing.
    #[must_use]
    pub fn mosaic(&self, templates: &PasteTemplates) -> Vec<Segment> {
        let mut masks = self.place(templates);
        masks.retain(|m| !m.is_empty());
        masks
    }

    fn place(&self, templates: &PasteTemplates) -> Vec<Segment> {
        let (vx, vy) = (self.origin.x, self.origin.y);
        let (start, col_end, row_end) = self.tile_ranges();

        let corner = templates.corner.translate(vx, vy);
        let mut masks = vec![
            corner.clone(),
            corner.mirror_h(),
            corner.rotate_180(),
            corner.mirror_v(),
        ];

        let row = templates.edge_row.translate(vx, vy);
        let row_mirrored = row.mirror_v();
        for i in start..col_end {
            let dx = -(as_f64(i) * self.pitch_h);
            masks.push(row.translate(dx, 0.0));
            masks.push(row_mirrored.translate(dx, 0.0));
        }

        let column = templates.edge_column.translate(vx, vy);
        let column_mirrored = column.mirror_h();
        for j in start..row_end {
            let dy = -(as_f64(j) * self.pitch_v);
            masks.push(column.translate(0.0, dy));
            masks.push(column_mirrored.translate(0.0, dy));
        }

        for i in start..col_end {
            let x = as_f64(i).mul_add(-self.pitch_h, vx);
            for j in start..row_end {
                let y = as_f64(j).mul_add(-self.pitch_v, vy);
                masks.push(templates.interior.translate(x, y));
            }
        }
        masks
    }

    /// First index and end indices of the row/column/interior tile runs.
    const fn tile_ranges(&self) -> (usize, usize, usize) {
        if self.dense {
            (1, self.columns.saturating_sub(2), self.rows.saturating_sub(2))
        } else {
            (0, self.columns.saturating_sub(1), self.rows.saturating_sub(1))
        }
    }
}

/// Total paste area from the template areas and the number of placements.
#[must_use]
pub fn paste_area(templates: &PasteTemplates, grid: &ViaGrid) -> f64 {
    let [a1, a2, a3, a4] = templates.as_array().map(Segment::area);
    let reduce = if grid.is_dense() { 3 } else { 1 };
    let cols = as_f64(grid.columns.saturating_sub(reduce));
    let rows = as_f64(grid.rows.saturating_sub(reduce));
    (a4 * rows).mul_add(2.0, (a3 * cols).mul_add(rows, (a2 * cols).mul_add(2.0, a1 * 4.0)))
}

fn asin_clamped(ratio: f64) -> f64 {
    ratio.clamp(-1.0, 1.0).asin()
}

#[allow(clippy::cast_precision_loss)]
fn as_f64(n: usize) -> f64 {
    n as f64
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::ThermalTab;
    use super::*;

    fn builder(tab: &ThermalTab) -> PasteBuilder {
        PasteBuilder::new(tab.props(), tab.via_grid())
    }

    fn inside_pad(tab: &ThermalTab, masks: &[Segment]) -> bool {
        let half_l = tab.props().pad_length / 2.0 + 1e-4;
        let half_w = tab.props().pad_width / 2.0 + 1e-4;
        masks
            .iter()
            .flat_map(Segment::points)
            .all(|p| p.x.abs() <= half_l && p.y.abs() <= half_w)
    }

    #[test]
    fn corner_matches_tabulated_points() {
        let c = PasteBuilder::corner();
        assert_eq!(c.len(), 6);
        assert_eq!(c.points()[1], Point::new(0.0185, 0.0571));
        assert_eq!(c.last(), Some(Point::new(0.06, 0.0)));
    }

    #[test]
    fn bows_touch_keepout_circle() {
        let tab = ThermalTab::new();
        let b = builder(&tab);
        let bows = b.bows();
        assert!(bows.ne.is_finite());
        // Mid section points lie on the main arc.
        let on_arc = bows
            .ne
            .points()
            .iter()
            .filter(|p| (p.x.hypot(p.y) - b.main).abs() < 2e-4)
            .count();
        assert!(on_arc >= 3);
        // Mirrored bows keep the point count.
        assert_eq!(bows.nw.len(), bows.ne.len());
        assert_eq!(bows.sw.len(), bows.ne.len());
    }

    #[test]
    fn default_grid_mosaic() {
        let tab = ThermalTab::new();
        let b = builder(&tab);
        let templates = b.templates();
        assert_eq!(templates.len(), 4);
        let masks = b.mosaic(&templates);
        // 4 corners + 2 * 2 row tiles + 2 * 2 column tiles + 2 * 2 interior
        assert_eq!(masks.len(), 16);
        assert!(inside_pad(&tab, &masks));
    }

    #[test]
    fn dense_mosaic_counts() {
        let mut tab = ThermalTab::new();
        tab.set_props(&json!({"viaPitchH": 0.5, "viaPitchV": 0.5}));
        assert!(tab.via_grid().is_dense());
        let b = builder(&tab);
        let masks = b.mosaic(&b.templates());
        // 6x6 vias: 4 corners + 2 * 3 + 2 * 3 + 3 * 3
        assert_eq!(masks.len(), 25);
        assert!(masks.iter().all(Segment::is_finite));
        assert!(inside_pad(&tab, &masks));
    }

    #[test]
    fn analytic_area_matches_placed_tiles() {
        for update in [
            json!({}),
            json!({"viaPitchH": 0.5, "viaPitchV": 0.5}),
            json!({"viaPitchH": 0.6, "viaPitchV": 0.8, "viaLayout": "grid", "padLength": 5}),
            json!({"viaTenting": true, "padLength": 6, "padWidth": 4, "viaPitchH": 0.7}),
        ] {
            let mut tab = ThermalTab::new();
            tab.set_props(&update);
            let b = builder(&tab);
            let templates = b.templates();
            let placed: f64 = b.mosaic(&templates).iter().map(Segment::area).sum();
            let analytic = paste_area(&templates, tab.via_grid());
            assert!((placed - analytic).abs() < 1e-6, "{update}: {placed} vs {analytic}");
        }
    }

    #[test]
    fn dense_edge_cut_by_pad_boundary() {
        // Pad edge closer to the outer vias than the tip radius.
        let mut tab = ThermalTab::new();
        tab.set_props(&json!({
            "padLength": 2.85, "padWidth": 2.85, "viaPitchH": 0.3, "viaPitchV": 0.3,
            "viaDiameter": 0.1, "viaRingWidth": 0.015, "pasteShrink": 0.05,
        }));
        let b = builder(&tab);
        assert!(tab.via_grid().is_dense());
        assert_eq!(tab.via_grid().columns, 10);
        assert!(b.right_edge < MINOR && b.top_edge < MINOR);
        let t = b.templates();
        assert!(t.as_array().iter().all(|s| s.is_finite() && s.area() > 0.0));
    }

    #[test]
    fn small_pad_drops_folding_tiles() {
        for update in [
            json!({"padLength": 1.3, "padWidth": 1.3, "viaDiameter": 0.5, "pasteShrink": 0.5,
                   "pasteSpacing": 0, "viaTenting": false}),
            json!({"padLength": 2.0, "padWidth": 2.0, "viaRingWidth": 1.0, "viaTenting": true,
                   "pasteShrink": 0.5}),
        ] {
            let mut tab = ThermalTab::new();
            tab.set_props(&update);
            assert_eq!(tab.via_grid().count(), 1, "{update}");
            let b = builder(&tab);
            let t = b.templates();
            assert!(t.corner.is_empty() && t.edge_column.is_empty() && t.edge_row.is_empty());
            assert!(b.mosaic(&t).is_empty());
            assert!(paste_area(&t, tab.via_grid()).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn narrow_pad_keeps_only_fitting_tiles() {
        // 0.5 mm vias tented: the 1 mm side is too short, the 6 mm side is not
        let mut tab = ThermalTab::new();
        tab.set_props(&json!({
            "padLength": 1.0, "padWidth": 6.0, "viaDiameter": 0.5, "viaTenting": true,
            "viaLayout": "grid",
        }));
        let b = builder(&tab);
        let t = b.templates();
        assert_eq!(tab.via_grid().columns, 1);
        assert!(t.corner.is_empty() && t.edge_column.is_empty());
        assert!(!t.edge_row.is_empty());
        let masks = b.mosaic(&t);
        assert!(inside_pad(&tab, &masks));
        let placed: f64 = masks.iter().map(Segment::area).sum();
        assert!((placed - paste_area(&t, tab.via_grid())).abs() < 1e-9);
    }

    #[test]
    fn dense_corner_pieces_meet_halfway() {
        let mut tab = ThermalTab::new();
        tab.set_props(&json!({"viaPitchH": 0.5, "viaPitchV": 0.5}));
        let b = builder(&tab);
        // 2 * (0.23 + 0.06) > 0.5, the corner arcs of neighbouring vias overlap
        assert!(b.pitch_h < 2.0 * b.hypotenuse());
        let t = b.templates();
        let first = t.edge_row.first().unwrap();
        let last = t.edge_row.last().unwrap();
        assert!((first.x + 0.25).abs() < 1e-9 && (last.x + 0.25).abs() < 1e-9);
        assert!(t.edge_row.points().iter().all(|p| p.x <= 1e-9 && p.x >= -0.5 - 1e-9));
    }

    #[test]
    fn templates_serialise_as_list() {
        let tab = ThermalTab::new();
        let json = serde_json::to_value(builder(&tab).templates()).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(4));
    }
}
