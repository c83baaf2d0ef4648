//! Thermal tab (exposed centre pad) with a grid of thermal vias.
//!
//! The generator keeps a validated parameter set ([`ThermalTabProps`]) and a
//! derived via grid ([`ViaGrid`]) that is recomputed wholesale on every
//! [`ThermalTab::set_props`] call. All outlines are derived from those two
//! values on demand:
//!
//! - solder-mask openings, optionally scalloped around tented vias
//!   ([`solder_mask`])
//! - the paste stencil mosaic built from four tile templates ([`paste`])
//! - via centres and coverage metrics
//!
//! # Via layouts
//!
//! - **Grid**: vias far enough from the pad edge that every paste tile sees a
//!   rounded pad corner or straight pad edge.
//! - **Dense**: vias packed using only the via ring as edge margin. Tiles next
//!   to the pad edge are cut by the edge itself. A dense request silently
//!   becomes grid when the packing happens to leave grid margins anyway, or
//!   when fewer than three columns or rows fit.

pub mod paste;
pub mod solder_mask;

use std::f64::consts::PI;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

pub use paste::PasteTemplates;

use super::props::{round_down_to, round_to, round_up_to, PropertyBag};
use crate::geometry::{Point, Segment, ARC_RES};

/// Radius of the rounded paste corners (mm).
pub const CORNER_RAD: f64 = 0.06;

/// Recommended paste to solder-mask-defined area ratio.
pub const RECOMMENDED_PASTE_TO_SMD: RangeInclusive<f64> = 0.5..=0.7;

const MIN_PAD_SIZE: f64 = 1.0;
const MAX_PAD_SIZE: f64 = 100.0;
const MAX_MASK_SWELL: f64 = 1.0;
const MAX_PASTE_SHRINK: f64 = 0.5;
const MIN_VIA_DIA: f64 = 0.1;
const MAX_VIA_DIA: f64 = 0.5;
const MIN_VIA_RING_W: f64 = 0.015;
const MAX_VIA_RING_W: f64 = 1.0;
const MIN_VIA_PITCH: f64 = 0.1;

/// sin(40°), bounds the paste spacing so the bow tips stay convex.
const MAX_SPACING_SIN: f64 = 0.64;

/// Via placement strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViaLayout {
    /// Uniform grid with paste clearance to the pad edge.
    Grid,
    /// Tighter packing, edge tiles cut by the pad boundary.
    #[default]
    Dense,
}

impl ViaLayout {
    /// Parses `"grid"` or `"dense"` (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grid" => Some(Self::Grid),
            "dense" => Some(Self::Dense),
            _ => None,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Dense => "dense",
        }
    }
}

impl std::fmt::Display for ViaLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thermal tab parameters (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermalTabProps {
    /// Horizontal pad length (D2).
    pub pad_length: f64,
    /// Vertical pad width (E2).
    pub pad_width: f64,
    /// Horizontal via pitch.
    pub via_pitch_h: f64,
    /// Vertical via pitch.
    pub via_pitch_v: f64,
    /// Width of the ring around each via (anti-pad / tenting relief).
    pub via_ring_width: f64,
    /// Drilled via diameter.
    pub via_diameter: f64,
    /// Cover the vias with solder mask.
    pub via_tenting: bool,
    /// Solder-mask swell. Zero gives a solder-mask-defined pad.
    pub mask_swell: f64,
    /// Paste shrink from the pad edge and via keep-outs.
    pub paste_shrink: f64,
    /// Gap between neighbouring paste apertures.
    pub paste_spacing: f64,
    /// Requested via layout.
    pub via_layout: ViaLayout,
}

impl Default for ThermalTabProps {
    fn default() -> Self {
        Self {
            pad_length: 3.15,
            pad_width: 3.15,
            via_pitch_h: 1.0,
            via_pitch_v: 1.0,
            via_ring_width: 0.08,
            via_diameter: 0.3,
            via_tenting: false,
            mask_swell: 0.08,
            paste_shrink: 0.08,
            paste_spacing: 0.25,
            via_layout: ViaLayout::Dense,
        }
    }
}

impl ThermalTabProps {
    /// Radius of the via keep-out seen by the paste layer, without shrink.
    #[must_use]
    pub fn via_keepout_radius(&self) -> f64 {
        self.via_diameter / 2.0 + if self.via_tenting { self.via_ring_width } else { 0.0 }
    }

    /// Distance from a via centre to the centre of a bow tip arc.
    fn bow_hypotenuse(&self) -> f64 {
        self.via_keepout_radius() + self.paste_shrink + CORNER_RAD
    }

    /// Largest paste spacing the bow tips can absorb.
    ///
    /// Half the spacing plus the tip radius may reach 0.64 of the bow
    /// hypotenuse, which keeps the tip angle at or below 40°.
    fn max_paste_spacing(&self) -> f64 {
        round_to(
            2.0 * MAX_SPACING_SIN.mul_add(self.bow_hypotenuse(), -CORNER_RAD),
            0.01,
        )
    }

    /// Half the via-to-via distance taken up by one bow tip.
    fn bow_adjacent(&self) -> f64 {
        let hyp = self.bow_hypotenuse();
        let opp = self.paste_spacing / 2.0 + CORNER_RAD;
        hyp.mul_add(hyp, -(opp * opp)).max(0.0).sqrt()
    }
}

/// Via grid derived from the parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViaGrid {
    /// Layout actually used for the outlines.
    pub layout: ViaLayout,
    /// Number of via columns.
    pub columns: usize,
    /// Number of via rows.
    pub rows: usize,
    /// Centre of the top-right via.
    pub origin: Point,
    /// Smallest allowed via pitch for the current paste settings.
    pub min_via_pitch: f64,
    /// Largest allowed paste spacing for the current via settings.
    pub max_paste_spacing: f64,
}

impl ViaGrid {
    fn compute(props: &ThermalTabProps) -> Self {
        let adj = props.bow_adjacent();
        let (length, width) = (props.pad_length, props.pad_width);
        let (pitch_h, pitch_v) = (props.via_pitch_h, props.via_pitch_v);
        let margin = 2.0 * (props.paste_shrink + CORNER_RAD + ARC_RES + adj);
        let grid_count = |size: f64, pitch: f64| count(1.0 + ((size - margin) / pitch).floor());

        let (layout, columns, rows) = match props.via_layout {
            ViaLayout::Grid => (
                ViaLayout::Grid,
                grid_count(length, pitch_h),
                grid_count(width, pitch_v),
            ),
            ViaLayout::Dense => {
                let margin2 = 2.0 * (props.via_diameter / 2.0 + props.via_ring_width);
                let hdiv = ((length - margin2) / pitch_h).floor().max(0.0);
                let vdiv = ((width - margin2) / pitch_v).floor().max(0.0);
                let (columns, rows) = (count(hdiv + 1.0), count(vdiv + 1.0));
                if hdiv.mul_add(-pitch_h, length) >= margin && vdiv.mul_add(-pitch_v, width) >= margin
                {
                    debug!(columns, rows, "dense via packing leaves grid margins, using grid");
                    (ViaLayout::Grid, columns, rows)
                } else if columns < 3 || rows < 3 {
                    let (columns, rows) = (grid_count(length, pitch_h), grid_count(width, pitch_v));
                    debug!(columns, rows, "dense via packing needs at least 3x3 vias, using grid");
                    (ViaLayout::Grid, columns, rows)
                } else if pitch_h.min(pitch_v) < 2.0 * (props.via_keepout_radius() + props.paste_shrink) {
                    // truncated edge bows would reach into the neighbouring keep-out
                    let (columns, rows) = (grid_count(length, pitch_h), grid_count(width, pitch_v));
                    debug!(columns, rows, "via keep-outs overlap, using grid");
                    (ViaLayout::Grid, columns, rows)
                } else {
                    (ViaLayout::Dense, columns, rows)
                }
            }
        };

        #[allow(clippy::cast_precision_loss)]
        let origin = Point::new(
            0.5 * (columns - 1) as f64 * pitch_h,
            0.5 * (rows - 1) as f64 * pitch_v,
        );

        Self {
            layout,
            columns,
            rows,
            origin,
            min_via_pitch: min_via_pitch(adj),
            max_paste_spacing: props.max_paste_spacing(),
        }
    }

    /// Total number of vias.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.columns * self.rows
    }

    /// Returns `true` for the dense tile families.
    #[must_use]
    pub fn is_dense(&self) -> bool {
        self.layout == ViaLayout::Dense
    }
}

/// Area bookkeeping for the exposed pad (mm² and ratios).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    /// Pad length × width.
    pub pad_area: f64,
    /// Pad area minus the via keep-outs.
    pub smd_area: f64,
    /// Total paste aperture area.
    pub paste_area: f64,
    /// Paste / pad area.
    pub paste_to_pad: f64,
    /// Paste / SMD area.
    pub paste_to_smd: f64,
    /// Paste / pad area in whole percent.
    pub paste_to_pad_percent: f64,
    /// Paste / SMD area in whole percent.
    pub paste_to_smd_percent: f64,
    /// Paste / SMD ratio lies in [`RECOMMENDED_PASTE_TO_SMD`].
    pub within_recommended: bool,
}

impl Coverage {
    fn new(pad_area: f64, smd_area: f64, paste_area: f64) -> Self {
        let ratio = |num: f64, den: f64| if den > 0.0 { num / den } else { 0.0 };
        let paste_to_pad = ratio(paste_area, pad_area);
        let paste_to_smd = ratio(paste_area, smd_area);
        Self {
            pad_area,
            smd_area,
            paste_area,
            paste_to_pad,
            paste_to_smd,
            paste_to_pad_percent: (paste_to_pad * 100.0).round(),
            paste_to_smd_percent: (paste_to_smd * 100.0).round(),
            within_recommended: RECOMMENDED_PASTE_TO_SMD.contains(&paste_to_smd),
        }
    }
}

/// Everything produced for one parameter set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermalTabGeometry {
    /// Validated parameters.
    pub props: ThermalTabProps,
    /// Derived via grid.
    pub via_grid: ViaGrid,
    /// Solder-mask openings.
    pub solder_masks: Vec<Segment>,
    /// Placed paste apertures.
    pub paste_masks: Vec<Segment>,
    /// The four paste tile templates.
    pub paste_mask_templates: PasteTemplates,
    /// Via centres, column-major from the top-right via.
    pub via_positions: Vec<Point>,
    /// Area metrics.
    pub coverage: Coverage,
}

/// Thermal tab generator.
#[derive(Debug, Clone)]
pub struct ThermalTab {
    props: ThermalTabProps,
    grid: ViaGrid,
}

impl Default for ThermalTab {
    fn default() -> Self {
        Self::new()
    }
}

impl ThermalTab {
    /// Creates a generator with default parameters.
    #[must_use]
    pub fn new() -> Self {
        let mut tab = Self {
            props: ThermalTabProps::default(),
            grid: ViaGrid::compute(&ThermalTabProps::default()),
        };
        tab.set_props(&Value::Null);
        tab
    }

    /// Current validated parameters.
    #[must_use]
    pub const fn props(&self) -> &ThermalTabProps {
        &self.props
    }

    /// Derived via grid.
    #[must_use]
    pub const fn via_grid(&self) -> &ViaGrid {
        &self.grid
    }

    /// Applies a partial update and returns the validated parameters.
    ///
    /// Never fails. Numeric fields are clamped to their ranges and rounded to
    /// their grids, unreadable fields are ignored. Via pitches are raised to
    /// the minimum the paste settings allow, then the via grid is rebuilt.
    pub fn set_props(&mut self, update: &Value) -> ThermalTabProps {
        let bag = PropertyBag::new(update);
        let p = &mut self.props;

        p.pad_length = bag.bounded("padLength", p.pad_length, MIN_PAD_SIZE, MAX_PAD_SIZE, 0.01);
        p.pad_width = bag.bounded("padWidth", p.pad_width, MIN_PAD_SIZE, MAX_PAD_SIZE, 0.01);
        p.mask_swell = bag.bounded("maskSwell", p.mask_swell, 0.0, MAX_MASK_SWELL, 0.001);
        p.paste_shrink = bag.bounded("pasteShrink", p.paste_shrink, 0.0, MAX_PASTE_SHRINK, 0.001);
        p.via_diameter = bag.bounded("viaDiameter", p.via_diameter, MIN_VIA_DIA, MAX_VIA_DIA, 0.01);
        p.via_ring_width = bag.bounded(
            "viaRingWidth",
            p.via_ring_width,
            MIN_VIA_RING_W,
            MAX_VIA_RING_W,
            0.001,
        );
        let max_pitch_v = max_via_pitch(p.pad_width);
        let max_pitch_h = max_via_pitch(p.pad_length);
        p.via_pitch_v = bag.bounded("viaPitchV", p.via_pitch_v, MIN_VIA_PITCH, max_pitch_v, 0.1);
        p.via_pitch_h = bag.bounded("viaPitchH", p.via_pitch_h, MIN_VIA_PITCH, max_pitch_h, 0.1);

        if let Some(tenting) = bag.flag("viaTenting") {
            p.via_tenting = tenting;
        }
        if let Some(layout) = bag.text("viaLayout").and_then(ViaLayout::parse) {
            p.via_layout = layout;
        }

        let max_spacing = p.max_paste_spacing();
        p.paste_spacing = bag.bounded("pasteSpacing", p.paste_spacing, 0.0, max_spacing, 0.01);

        let min_pitch = min_via_pitch(p.bow_adjacent());
        if p.via_pitch_v < min_pitch {
            debug!(requested = p.via_pitch_v, min_pitch, "vertical via pitch raised");
            p.via_pitch_v = min_pitch;
        }
        if p.via_pitch_h < min_pitch {
            debug!(requested = p.via_pitch_h, min_pitch, "horizontal via pitch raised");
            p.via_pitch_h = min_pitch;
        }

        self.grid = ViaGrid::compute(&self.props);
        trace!(props = ?self.props, grid = ?self.grid, "thermal tab props updated");
        self.props
    }

    /// Solder-mask openings.
    #[must_use]
    pub fn solder_masks(&self) -> Vec<Segment> {
        solder_mask::solder_masks(&self.props, &self.grid)
    }

    /// The four paste tile templates.
    #[must_use]
    pub fn paste_templates(&self) -> PasteTemplates {
        paste::PasteBuilder::new(&self.props, &self.grid).templates()
    }

    /// Placed paste apertures.
    #[must_use]
    pub fn paste_masks(&self) -> Vec<Segment> {
        let builder = paste::PasteBuilder::new(&self.props, &self.grid);
        builder.mosaic(&builder.templates())
    }

    /// Total paste area, from the template areas.
    #[must_use]
    pub fn paste_area(&self) -> f64 {
        paste::paste_area(&self.paste_templates(), &self.grid)
    }

    /// Via centres, column by column starting at the top-right via.
    #[must_use]
    pub fn via_positions(&self) -> Vec<Point> {
        let g = &self.grid;
        let (pitch_h, pitch_v) = (self.props.via_pitch_h, self.props.via_pitch_v);
        (0..g.columns)
            .flat_map(|i| {
                (0..g.rows).map(move |j| {
                    #[allow(clippy::cast_precision_loss)]
                    let (i, j) = (i as f64, j as f64);
                    Point::new(
                        i.mul_add(-pitch_h, g.origin.x),
                        j.mul_add(-pitch_v, g.origin.y),
                    )
                })
            })
            .collect()
    }

    /// Area metrics for the current parameters.
    #[must_use]
    pub fn coverage(&self) -> Coverage {
        self.coverage_with(self.paste_area())
    }

    fn coverage_with(&self, paste_area: f64) -> Coverage {
        let p = &self.props;
        let pad_area = p.pad_length * p.pad_width;
        let r = p.via_keepout_radius();
        #[allow(clippy::cast_precision_loss)]
        let vias = self.grid.count() as f64;
        let smd_area = (vias * PI * r).mul_add(-r, pad_area);
        Coverage::new(pad_area, smd_area, paste_area)
    }

    /// Computes every output for the current parameters.
    #[must_use]
    pub fn generate(&self) -> ThermalTabGeometry {
        let builder = paste::PasteBuilder::new(&self.props, &self.grid);
        let templates = builder.templates();
        let paste_masks = builder.mosaic(&templates);
        let paste_area = paste::paste_area(&templates, &self.grid);
        ThermalTabGeometry {
            props: self.props,
            via_grid: self.grid,
            solder_masks: self.solder_masks(),
            paste_masks,
            paste_mask_templates: templates,
            via_positions: self.via_positions(),
            coverage: self.coverage_with(paste_area),
        }
    }
}

/// Via count from a raw division result, never below one.
fn count(raw: f64) -> usize {
    if raw.is_finite() && raw >= 1.0 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let n = raw as usize;
        n
    } else {
        1
    }
}

/// Half the pad size, rounded down onto the 0.1 mm pitch grid.
fn max_via_pitch(pad_size: f64) -> f64 {
    round_down_to(pad_size / 2.0, 0.1).max(MIN_VIA_PITCH)
}

/// Smallest via pitch (on the 0.1 mm grid) that keeps two bow tips apart.
fn min_via_pitch(adj: f64) -> f64 {
    round_up_to(2.0f64.mul_add(adj, ARC_RES), 0.1)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn default_grid_is_three_by_three() {
        let tab = ThermalTab::new();
        let g = tab.via_grid();
        assert_eq!((g.columns, g.rows), (3, 3));
        assert_eq!(g.layout, ViaLayout::Grid);
        assert_eq!(tab.props().via_layout, ViaLayout::Dense);
        assert!((g.origin.x - 1.0).abs() < 1e-12);
        assert!((g.origin.y - 1.0).abs() < 1e-12);
        assert!((g.min_via_pitch - 0.5).abs() < 1e-12);
        assert!((g.max_paste_spacing - 0.25).abs() < 1e-12);
    }

    #[test]
    fn via_positions_are_column_major() {
        let tab = ThermalTab::new();
        let pos = tab.via_positions();
        assert_eq!(pos.len(), 9);
        assert_eq!(pos[0], Point::new(1.0, 1.0));
        assert_eq!(pos[1], Point::new(1.0, 0.0));
        assert_eq!(pos[3], Point::new(0.0, 1.0));
        assert_eq!(pos[8], Point::new(-1.0, -1.0));
    }

    #[test]
    fn via_diameter_is_clamped() {
        let mut tab = ThermalTab::new();
        let p = tab.set_props(&json!({"viaDiameter": 999}));
        assert!((p.via_diameter - 0.5).abs() < f64::EPSILON);
        let p = tab.set_props(&json!({"viaDiameter": -1}));
        assert!((p.via_diameter - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn pitch_raised_to_minimum() {
        let mut tab = ThermalTab::new();
        let p = tab.set_props(&json!({"viaPitchH": 0.1, "viaPitchV": 0.1}));
        let min = tab.via_grid().min_via_pitch;
        assert!(p.via_pitch_h >= min && p.via_pitch_v >= min);
        assert!((p.via_pitch_h - 0.5).abs() < 1e-12);
    }

    #[test]
    fn unknown_layout_is_ignored() {
        let mut tab = ThermalTab::new();
        tab.set_props(&json!({"viaLayout": "GRID"}));
        assert_eq!(tab.props().via_layout, ViaLayout::Grid);
        tab.set_props(&json!({"viaLayout": "none"}));
        assert_eq!(tab.props().via_layout, ViaLayout::Grid);
        tab.set_props(&json!({"viaLayout": 2}));
        assert_eq!(tab.props().via_layout, ViaLayout::Grid);
    }

    #[test]
    fn paste_spacing_limited_by_via_size() {
        let mut tab = ThermalTab::new();
        let p = tab.set_props(&json!({"pasteSpacing": 5}));
        assert!((p.paste_spacing - 0.25).abs() < 1e-12);
        let p = tab.set_props(&json!({"viaDiameter": 0.5}));
        // hyp = 0.25 + 0.08 + 0.06, 2 * (0.64 * 0.39 - 0.06) = 0.3792
        assert!((p.paste_spacing - 0.25).abs() < 1e-12);
        let p = tab.set_props(&json!({"pasteSpacing": 5}));
        assert!((p.paste_spacing - 0.38).abs() < 1e-12);
    }

    #[test]
    fn bow_tip_angle_stays_below_forty_degrees() {
        let mut tab = ThermalTab::new();
        for update in [
            json!({"viaDiameter": 0.1, "viaRingWidth": 0.015, "pasteShrink": 0.0}),
            json!({"viaDiameter": 0.5, "viaTenting": true, "viaRingWidth": 1.0, "pasteShrink": 0.5}),
            json!({"viaDiameter": 0.3, "viaTenting": false}),
        ] {
            tab.set_props(&update);
            let p = tab.set_props(&json!({"pasteSpacing": 5}));
            let opp = p.paste_spacing / 2.0 + CORNER_RAD;
            // rounding onto the 0.01 grid may add 0.005 to the spacing
            assert!(opp / p.bow_hypotenuse() <= 0.64 + 0.0025 / p.bow_hypotenuse(), "{update}");
        }
    }

    #[test]
    fn pitch_cap_rounds_down_to_half_the_pad() {
        let mut tab = ThermalTab::new();
        let p = tab.set_props(&json!({"padLength": 3.15, "padWidth": 3.15, "viaPitchH": 5, "viaPitchV": 5}));
        assert!((p.via_pitch_h - 1.5).abs() < 1e-12);
        assert!((p.via_pitch_v - 1.5).abs() < 1e-12);
        assert!(p.via_pitch_h <= p.pad_length / 2.0);
        let p = tab.set_props(&json!({"padLength": 1.0, "padWidth": 1.0, "viaPitchH": 5}));
        assert!((p.via_pitch_h - 0.5).abs() < 1e-12);
    }

    #[test]
    fn overlapping_keepouts_fall_back_to_grid() {
        let mut tab = ThermalTab::new();
        // keep-out 0.25 + shrink 0.5 needs a 1.5 pitch, wide spacing allows 1.3
        tab.set_props(&json!({
            "padLength": 20, "padWidth": 20, "viaDiameter": 0.5, "viaRingWidth": 0.015,
            "pasteShrink": 0.5, "pasteSpacing": 5, "viaPitchH": 1.4, "viaPitchV": 1.4,
            "viaLayout": "dense",
        }));
        let p = tab.props();
        assert!((p.via_pitch_h - 1.4).abs() < 1e-12);
        assert!(p.via_pitch_h < 2.0 * (p.via_keepout_radius() + p.paste_shrink));
        assert_eq!(tab.via_grid().layout, ViaLayout::Grid);
    }

    #[test]
    fn tight_pitch_gives_dense_layout() {
        let mut tab = ThermalTab::new();
        tab.set_props(&json!({"viaPitchH": 0.5, "viaPitchV": 0.5, "viaLayout": "dense"}));
        let g = tab.via_grid();
        // margin2 = 0.46, hdiv = floor(2.69 / 0.5) = 5, 3.15 - 2.5 = 0.65 < 0.7667
        assert_eq!(g.layout, ViaLayout::Dense);
        assert_eq!((g.columns, g.rows), (6, 6));
    }

    #[test]
    fn grid_request_uses_paste_margin() {
        let mut tab = ThermalTab::new();
        tab.set_props(&json!({"viaPitchH": 0.5, "viaPitchV": 0.5, "viaLayout": "grid"}));
        let g = tab.via_grid();
        // 1 + floor((3.15 - 0.7667) / 0.5) = 5
        assert_eq!(g.layout, ViaLayout::Grid);
        assert_eq!((g.columns, g.rows), (5, 5));
    }

    #[test]
    fn small_dense_falls_back_to_grid() {
        let mut tab = ThermalTab::new();
        tab.set_props(&json!({"padLength": 1.2, "padWidth": 1.2, "viaPitchH": 0.5, "viaPitchV": 0.5}));
        let g = tab.via_grid();
        assert_eq!(g.layout, ViaLayout::Grid);
        assert!(g.columns >= 1 && g.rows >= 1);
    }

    #[test]
    fn coverage_of_default_tab() {
        let tab = ThermalTab::new();
        let c = tab.coverage();
        assert!((c.pad_area - 3.15 * 3.15).abs() < 1e-9);
        let expected_smd = 3.15f64.mul_add(3.15, -(9.0 * PI * 0.15 * 0.15));
        assert!((c.smd_area - expected_smd).abs() < 1e-9);
        assert!(c.paste_area > 0.0 && c.paste_area < c.pad_area);
        assert!(c.paste_to_smd > c.paste_to_pad);
    }

    #[test]
    fn generate_matches_individual_calls() {
        let tab = ThermalTab::new();
        let all = tab.generate();
        assert_eq!(all.solder_masks, tab.solder_masks());
        assert_eq!(all.paste_masks, tab.paste_masks());
        assert_eq!(all.via_positions, tab.via_positions());
        assert!((all.coverage.paste_area - tab.paste_area()).abs() < f64::EPSILON);
    }

    #[test]
    fn layout_serialises_lowercase() {
        let json = serde_json::to_value(ThermalTabProps::default()).unwrap();
        assert_eq!(json["viaLayout"], "dense");
        assert_eq!(json["padLength"], 3.15);
    }
}
