//! padstack-mcp: land-pattern geometry for QFN and LQFP footprints.
//!
//! The library computes copper, solder-mask and paste-stencil outlines for
//! two pad families and serves them to tool-driven clients over MCP:
//!
//! - **D-shape terminals**: perimeter pads with a rounded toe.
//! - **Thermal tabs**: the exposed pad under the package, with a via grid and
//!   paste apertures cut around the vias.
//!
//! Outlines are closed clockwise polygons in millimetres with y pointing up.
//! The generators never fail: out-of-range parameters are clamped.
//!
//! # Modules
//!
//! - [`geometry`]: segment algebra and arc tessellation
//! - [`pads`]: the D-shape and thermal tab generators
//! - [`pattern`]: footprint, template and pad data model
//! - [`render`]: SVG path data
//! - [`mcp`]: MCP protocol, transport and tools
//! - [`config`]: configuration loading
//! - [`error`]: error types

pub mod config;
pub mod error;
pub mod geometry;
pub mod mcp;
pub mod pads;
pub mod pattern;
pub mod render;
