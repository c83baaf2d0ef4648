//! Pad-stack generators.
//!
//! Each generator owns its parameter set and exposes a single validated
//! update entry point (`set_props`) that never fails: out-of-range values are
//! clamped, unreadable values are ignored. Outlines are recomputed in full on
//! every call and returned as clockwise [`Segment`](crate::geometry::Segment)s.
//!
//! - [`d_shape`] - rounded terminal pads for QFN/LQFP leads
//! - [`thermal_tab`] - exposed centre pad with a thermal via grid

pub mod d_shape;
pub mod props;
pub mod thermal_tab;

pub use d_shape::{DShapeOutlines, DShapePad, DShapeProps};
pub use props::PropertyBag;
pub use thermal_tab::{
    Coverage, PasteTemplates, ThermalTab, ThermalTabGeometry, ThermalTabProps, ViaGrid, ViaLayout,
};
