//! IPC-7351B names for quad packages.
//!
//! Format: `{PREFIX}{PITCH}P{LENGTH}X{WIDTH}X{HEIGHT}-{PINS}{VARIANT}{DENSITY}`
//!
//! Dimensions are in 0.01 mm units. The height part is left out when the body
//! height is unknown. The variant is only used for no-lead packages: `T` with
//! a thermal pad, `N` without.

use super::density::DensityLevel;

/// Name for a QFN/DFN/SON package.
///
/// ```
/// use padstack_mcp::pattern::{density::DensityLevel, naming::qfn_name};
///
/// let name = qfn_name("QFN", 0.5, 5.0, 5.0, Some(1.0), 28, true, DensityLevel::Nominal);
/// assert_eq!(name, "QFN50P500X500X100-28TN");
/// ```
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn qfn_name(
    prefix: &str,
    pitch: f64,
    body_length: f64,
    body_width: f64,
    height: Option<f64>,
    pin_count: u32,
    has_thermal_pad: bool,
    density: DensityLevel,
) -> String {
    let variant = if has_thermal_pad { "T" } else { "N" };
    format!(
        "{prefix}{body}-{pin_count}{variant}{density}",
        body = body_part(pitch, body_length, body_width, height),
        density = density.suffix()
    )
}

/// Name for a QFP/LQFP/TQFP package.
#[must_use]
pub fn qfp_name(
    prefix: &str,
    pitch: f64,
    body_length: f64,
    body_width: f64,
    height: Option<f64>,
    pin_count: u32,
    density: DensityLevel,
) -> String {
    format!(
        "{prefix}{body}-{pin_count}{density}",
        body = body_part(pitch, body_length, body_width, height),
        density = density.suffix()
    )
}

fn body_part(pitch: f64, body_length: f64, body_width: f64, height: Option<f64>) -> String {
    let pitch_units = mm_to_hundredths(pitch);
    let length_units = mm_to_hundredths(body_length);
    let width_units = mm_to_hundredths(body_width);
    height.map_or_else(
        || format!("{pitch_units}P{length_units}X{width_units}"),
        |h| {
            let height_units = mm_to_hundredths(h);
            format!("{pitch_units}P{length_units}X{width_units}X{height_units}")
        },
    )
}

/// Converts millimetres to 0.01 mm units, rounded.
fn mm_to_hundredths(mm: f64) -> u32 {
    // Package dimensions are positive and small
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let units = (mm * 100.0).round().max(0.0) as u32;
    units
}
