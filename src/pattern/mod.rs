//! Footprint pattern model.
//!
//! A [`Pattern`] names a footprint and aggregates pad instances. Each [`Pad`]
//! refers to a [`PadTemplate`] by id, and each template carries a [`PadStack`]
//! holding the geometry for every copper and mechanical layer. Pad stacks are
//! filled from the generator outputs in [`crate::pads`].
//!
//! This layer only holds data: it does not place pads around the body.

pub mod density;
pub mod naming;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::geometry::{Point, Segment};
use crate::pads::{DShapeOutlines, ThermalTabGeometry};
use density::{DensityLevel, SolderFilletGoals};

/// Package family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PackageType {
    /// Quad flat no-lead.
    #[default]
    Qfn,
    /// Low-profile quad flat package.
    Lqfp,
}

/// Base shape of a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TerminalShape {
    /// Rounded outer end (see [`crate::pads::d_shape`]).
    #[default]
    #[serde(rename = "d")]
    DShape,
    /// Rectangle.
    #[serde(rename = "r")]
    Rect,
    /// Circle.
    #[serde(rename = "c")]
    Circular,
    /// Oval.
    #[serde(rename = "b")]
    Oblong,
    /// Free-form polygon.
    #[serde(rename = "u")]
    Irregular,
}

/// Solder-mask treatment of a pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskState {
    /// Follow the pattern-wide setting.
    #[default]
    Common,
    /// Opening in the mask.
    Open,
    /// Covered by mask.
    Tented,
}

/// Solder-paste treatment of a pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PasteState {
    /// Follow the pattern-wide setting.
    #[default]
    Common,
    /// Stencil aperture.
    Solder,
    /// No paste.
    NoSolder,
}

/// Per-pin override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinModification {
    /// Regular pin.
    #[default]
    None,
    /// Pin removed from the footprint; its number is kept.
    Deleted,
    /// Pad present but without a visible number.
    Hidden,
}

/// Mask swell or paste shrink: a fixed value or the pattern default.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Clearance {
    /// Use the pattern-wide value.
    #[default]
    Auto,
    /// Explicit value (mm).
    Value(f64),
}

impl TryFrom<Value> for Clearance {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) if s.eq_ignore_ascii_case("auto") => Ok(Self::Auto),
            Value::Number(n) => n
                .as_f64()
                .map(Self::Value)
                .ok_or_else(|| format!("invalid clearance {n}")),
            other => Err(format!("expected a number or \"auto\", got {other}")),
        }
    }
}

impl From<Clearance> for Value {
    fn from(c: Clearance) -> Self {
        match c {
            Clearance::Auto => json!("auto"),
            Clearance::Value(v) => json!(v),
        }
    }
}

/// Drawing primitive on one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PatternGeometry {
    /// Line from `start` to `end`.
    Line {
        /// Start point.
        start: Point,
        /// End point.
        end: Point,
        /// Stroke width.
        width: f64,
    },
    /// Axis-aligned rectangle centred at `center`.
    Rect {
        /// Centre.
        center: Point,
        /// Horizontal size.
        length: f64,
        /// Vertical size.
        width: f64,
    },
    /// Axis-aligned ellipse centred at `center`.
    Ellipse {
        /// Centre.
        center: Point,
        /// Horizontal radius.
        radius_x: f64,
        /// Vertical radius.
        radius_y: f64,
    },
    /// Closed clockwise polygon.
    Polygon {
        /// Outline as a flat coordinate list.
        points: Segment,
    },
}

impl PatternGeometry {
    /// Area covered by the primitive (zero for lines).
    #[must_use]
    pub fn area(&self) -> f64 {
        match self {
            Self::Line { .. } => 0.0,
            Self::Rect { length, width, .. } => length * width,
            Self::Ellipse {
                radius_x, radius_y, ..
            } => std::f64::consts::PI * radius_x * radius_y,
            Self::Polygon { points } => points.area(),
        }
    }
}

/// Geometry per layer for one pad.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PadStack {
    /// Top copper.
    pub top: Vec<PatternGeometry>,
    /// Top paste.
    pub top_paste: Vec<PatternGeometry>,
    /// Top solder mask.
    pub top_mask: Vec<PatternGeometry>,
    /// Top silkscreen.
    pub top_silk: Vec<PatternGeometry>,
    /// Top assembly.
    pub top_assembly: Vec<PatternGeometry>,
    /// Top keep-out.
    pub top_keepout: Vec<PatternGeometry>,
    /// Bottom copper.
    pub bottom: Vec<PatternGeometry>,
    /// Bottom paste.
    pub bottom_paste: Vec<PatternGeometry>,
    /// Bottom solder mask.
    pub bottom_mask: Vec<PatternGeometry>,
    /// Bottom silkscreen.
    pub bottom_silk: Vec<PatternGeometry>,
    /// Bottom assembly.
    pub bottom_assembly: Vec<PatternGeometry>,
    /// Bottom keep-out.
    pub bottom_keepout: Vec<PatternGeometry>,
}

impl PadStack {
    /// Top-side stack from D-shape pad outlines.
    #[must_use]
    pub fn from_d_shape(outlines: &DShapeOutlines) -> Self {
        Self {
            top: vec![polygon(&outlines.pad)],
            top_mask: vec![polygon(&outlines.solder_mask)],
            top_paste: vec![polygon(&outlines.paste_mask)],
            ..Self::default()
        }
    }

    /// Top-side stack from a thermal tab.
    ///
    /// Copper is the full pad rectangle, vias go to the keep-out layer as
    /// drill-sized ellipses.
    #[must_use]
    pub fn from_thermal_tab(tab: &ThermalTabGeometry) -> Self {
        let p = &tab.props;
        let radius = p.via_diameter / 2.0;
        Self {
            top: vec![PatternGeometry::Rect {
                center: Point::default(),
                length: p.pad_length,
                width: p.pad_width,
            }],
            top_mask: tab.solder_masks.iter().map(polygon).collect(),
            top_paste: tab.paste_masks.iter().map(polygon).collect(),
            top_keepout: tab
                .via_positions
                .iter()
                .map(|&center| PatternGeometry::Ellipse {
                    center,
                    radius_x: radius,
                    radius_y: radius,
                })
                .collect(),
            ..Self::default()
        }
    }

    /// Returns `true` if no layer holds geometry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers().iter().all(|layer| layer.is_empty())
    }

    fn layers(&self) -> [&Vec<PatternGeometry>; 12] {
        [
            &self.top,
            &self.top_paste,
            &self.top_mask,
            &self.top_silk,
            &self.top_assembly,
            &self.top_keepout,
            &self.bottom,
            &self.bottom_paste,
            &self.bottom_mask,
            &self.bottom_silk,
            &self.bottom_assembly,
            &self.bottom_keepout,
        ]
    }
}

fn polygon(segment: &Segment) -> PatternGeometry {
    PatternGeometry::Polygon {
        points: segment.clone(),
    }
}

/// Pad template properties.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PadProperties {
    /// Pad width (X1).
    pub pad_width: f64,
    /// Pad length (Y1).
    pub pad_length: f64,
    /// Top mask treatment.
    pub top_mask_state: MaskState,
    /// Bottom mask treatment.
    pub bottom_mask_state: MaskState,
    /// Top paste treatment.
    pub top_paste_state: PasteState,
    /// Bottom paste treatment.
    pub bottom_paste_state: PasteState,
    /// Mask swell.
    pub mask_swell: Clearance,
    /// Paste shrink.
    pub paste_shrink: Clearance,
}

/// Reusable pad definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PadTemplate {
    /// Id, unique within the pattern.
    pub uid: u32,
    /// Display name.
    pub name: String,
    /// Base shape.
    pub shape: TerminalShape,
    /// Properties.
    pub props: PadProperties,
    /// Computed geometry.
    pub pad_stack: PadStack,
}

/// Pad instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pad {
    /// Pin number.
    pub pin_number: u32,
    /// Deleted / hidden override.
    pub pin_mod: PinModification,
    /// X position (mm).
    pub position_x: f64,
    /// Y position (mm).
    pub position_y: f64,
    /// Counter-clockwise rotation (degrees).
    pub rotation: f64,
    /// Template id.
    pub use_template: u32,
    /// Geometry, copied from the template when the pad is added.
    pub pad_stack: PadStack,
}

/// Package dimensions and terminal defaults (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternProperties {
    /// Body length (D).
    pub body_length: f64,
    /// Body width (E).
    pub body_width: f64,
    /// Body height, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_height: Option<f64>,
    /// Terminal length (L).
    pub term_length: f64,
    /// Terminal width (b).
    pub term_width: f64,
    /// Terminal style.
    pub term_shape: TerminalShape,
    /// Pin pitch (e).
    pub pitch: f64,
    /// Pins, excluding the thermal pad.
    pub pin_count: u32,
    /// Toe fillet.
    #[serde(rename = "JT")]
    pub jt: f64,
    /// Heel fillet.
    #[serde(rename = "JH")]
    pub jh: f64,
    /// Side fillet.
    #[serde(rename = "JS")]
    pub js: f64,
}

impl PatternProperties {
    /// Overwrites the J-values with IPC-7351B goals.
    pub fn apply_fillet_goals(&mut self, goals: SolderFilletGoals) {
        self.jt = goals.toe;
        self.jh = goals.heel;
        self.js = goals.side;
    }

    /// Property update for [`crate::pads::DShapePad::set_props`].
    ///
    /// Negative J-values (allowed by IPC for some families) are passed as is
    /// and clamped by the pad generator.
    #[must_use]
    pub fn d_shape_update(&self) -> Value {
        json!({
            "termLength": self.term_length,
            "termWidth": self.term_width,
            "padToe": self.jt,
            "padHeel": self.jh,
            "padSide": self.js,
        })
    }
}

/// Footprint pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    /// Pattern name.
    pub name: String,
    /// Reference designator prefix.
    pub ref_des: String,
    /// Component value.
    pub value: String,
    /// Datasheet link.
    pub datasheet_url: String,
    /// 3D model link.
    pub model_url: String,
    /// Package family.
    pub package_type: PackageType,
    /// Dimensions.
    pub props: PatternProperties,
    /// Pad instances.
    pub pads: Vec<Pad>,
    /// Pad templates.
    pub pad_templates: Vec<PadTemplate>,
}

impl Pattern {
    /// Default 28-pin 5 x 5 mm QFN with D-shape terminals.
    #[must_use]
    pub fn new_qfn(name: Option<&str>) -> Self {
        Self {
            name: name.unwrap_or("Untitled").to_string(),
            ref_des: "U".to_string(),
            value: String::new(),
            datasheet_url: String::new(),
            model_url: String::new(),
            package_type: PackageType::Qfn,
            props: PatternProperties {
                body_length: 5.0,
                body_width: 5.0,
                body_height: None,
                term_length: 0.55,
                term_width: 0.24,
                term_shape: TerminalShape::DShape,
                pitch: 0.5,
                pin_count: 28,
                jt: 0.4,
                jh: 0.05,
                js: 0.0,
            },
            pads: Vec::new(),
            pad_templates: Vec::new(),
        }
    }

    /// Adds a template and returns its id.
    pub fn add_template(
        &mut self,
        name: &str,
        shape: TerminalShape,
        props: PadProperties,
        pad_stack: PadStack,
    ) -> u32 {
        let uid = self.pad_templates.iter().map(|t| t.uid).max().map_or(1, |m| m + 1);
        self.pad_templates.push(PadTemplate {
            uid,
            name: name.to_string(),
            shape,
            props,
            pad_stack,
        });
        uid
    }

    /// Looks up a template by id.
    #[must_use]
    pub fn template(&self, uid: u32) -> Option<&PadTemplate> {
        self.pad_templates.iter().find(|t| t.uid == uid)
    }

    /// Adds a pad using template `uid`, numbered after the last pad.
    ///
    /// Returns `None` if the template does not exist.
    pub fn add_pad(&mut self, uid: u32, x: f64, y: f64, rotation: f64) -> Option<u32> {
        let pad_stack = self.template(uid)?.pad_stack.clone();
        let pin_number = self.pads.iter().map(|p| p.pin_number).max().unwrap_or(0) + 1;
        self.pads.push(Pad {
            pin_number,
            pin_mod: PinModification::None,
            position_x: x,
            position_y: y,
            rotation,
            use_template: uid,
            pad_stack,
        });
        Some(pin_number)
    }

    /// Renumbers pads in order starting at `start`.
    ///
    /// Deleted pads keep their number and do not consume one.
    pub fn renumber_pins(&mut self, start: u32) {
        let mut next = start;
        for pad in &mut self.pads {
            if pad.pin_mod == PinModification::Deleted {
                continue;
            }
            pad.pin_number = next;
            next += 1;
        }
    }

    /// Fillet goals for this package family.
    #[must_use]
    pub const fn fillet_goals(&self, density: DensityLevel) -> SolderFilletGoals {
        match self.package_type {
            PackageType::Qfn => SolderFilletGoals::for_no_lead(density),
            PackageType::Lqfp => SolderFilletGoals::for_gull_wing(density),
        }
    }

    /// IPC-7351B name of the pattern.
    #[must_use]
    pub fn ipc_name(&self, density: DensityLevel, has_thermal_pad: bool) -> String {
        let p = &self.props;
        match self.package_type {
            PackageType::Qfn => naming::qfn_name(
                "QFN",
                p.pitch,
                p.body_length,
                p.body_width,
                p.body_height,
                p.pin_count,
                has_thermal_pad,
                density,
            ),
            PackageType::Lqfp => naming::qfp_name(
                "LQFP",
                p.pitch,
                p.body_length,
                p.body_width,
                p.body_height,
                p.pin_count,
                density,
            ),
        }
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self::new_qfn(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pads::{DShapePad, ThermalTab};

    #[test]
    fn default_qfn_pattern() {
        let p = Pattern::new_qfn(None);
        assert_eq!(p.name, "Untitled");
        assert_eq!(p.ref_des, "U");
        assert_eq!(p.props.pin_count, 28);
        assert_eq!(p.props.term_shape, TerminalShape::DShape);
        assert!(p.pads.is_empty() && p.pad_templates.is_empty());
        assert_eq!(Pattern::new_qfn(Some("QFN28")).name, "QFN28");
    }

    #[test]
    fn renumber_skips_deleted_pads() {
        let mut p = Pattern::new_qfn(None);
        let uid = p.add_template(
            "d",
            TerminalShape::DShape,
            PadProperties::default(),
            PadStack::default(),
        );
        for i in 0..4 {
            p.add_pad(uid, f64::from(i), 0.0, 0.0);
        }
        p.pads[1].pin_mod = PinModification::Deleted;
        p.pads[2].pin_mod = PinModification::Hidden;
        p.renumber_pins(10);
        let numbers: Vec<u32> = p.pads.iter().map(|pad| pad.pin_number).collect();
        assert_eq!(numbers, vec![10, 2, 11, 12]);
    }

    #[test]
    fn add_pad_needs_template() {
        let mut p = Pattern::new_qfn(None);
        assert_eq!(p.add_pad(7, 0.0, 0.0, 0.0), None);
    }

    #[test]
    fn template_ids_increase() {
        let mut p = Pattern::new_qfn(None);
        let props = PadProperties::default();
        let a = p.add_template("a", TerminalShape::Rect, props, PadStack::default());
        let b = p.add_template("b", TerminalShape::Rect, props, PadStack::default());
        assert_eq!((a, b), (1, 2));
        assert_eq!(p.template(2).map(|t| t.name.as_str()), Some("b"));
    }

    #[test]
    fn pad_stacks_from_generators() {
        let d = PadStack::from_d_shape(&DShapePad::new().outlines());
        assert_eq!(d.top.len(), 1);
        assert!(d.top_mask[0].area() > d.top[0].area());
        assert!(d.bottom.is_empty());

        let tab = ThermalTab::new().generate();
        let t = PadStack::from_thermal_tab(&tab);
        assert_eq!(t.top_paste.len(), tab.paste_masks.len());
        assert_eq!(t.top_keepout.len(), 9);
        assert!(!t.is_empty());
        assert!(PadStack::default().is_empty());
    }

    #[test]
    fn ipc_names() {
        let mut p = Pattern::new_qfn(None);
        assert_eq!(p.ipc_name(DensityLevel::Nominal, true), "QFN50P500X500-28TN");
        p.package_type = PackageType::Lqfp;
        p.props.body_height = Some(1.6);
        assert_eq!(p.ipc_name(DensityLevel::Most, false), "LQFP50P500X500X160-28M");
    }

    #[test]
    fn fillet_goals_follow_package() {
        let mut p = Pattern::new_qfn(None);
        let goals = p.fillet_goals(DensityLevel::Nominal);
        p.props.apply_fillet_goals(goals);
        assert!((p.props.jt - 0.30).abs() < f64::EPSILON);
        let update = p.props.d_shape_update();
        assert_eq!(update["padToe"], 0.3);
    }

    #[test]
    fn serialises_with_camel_case_field_names() {
        let json = serde_json::to_value(Pattern::new_qfn(None)).unwrap();
        assert_eq!(json["refDes"], "U");
        assert_eq!(json["packageType"], "QFN");
        assert_eq!(json["props"]["termShape"], "d");
        assert_eq!(json["props"]["JT"], 0.4);
        assert!(json["props"].get("bodyHeight").is_none());
    }

    #[test]
    fn clearance_accepts_auto_or_number() {
        let c: Clearance = serde_json::from_value(json!("auto")).unwrap();
        assert_eq!(c, Clearance::Auto);
        let c: Clearance = serde_json::from_value(json!(0.05)).unwrap();
        assert_eq!(c, Clearance::Value(0.05));
        assert!(serde_json::from_value::<Clearance>(json!(true)).is_err());
    }

    #[test]
    fn geometry_tagged_by_type() {
        let g = PatternGeometry::Rect {
            center: Point::default(),
            length: 2.0,
            width: 1.0,
        };
        let json = serde_json::to_value(&g).unwrap();
        assert_eq!(json["type"], "rect");
        assert!((g.area() - 2.0).abs() < f64::EPSILON);
    }
}
