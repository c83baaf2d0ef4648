//! Configuration file schema.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ConfigError;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root of `config.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Generator parameters applied when a session starts.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Tool output options.
    #[serde(default)]
    pub render: RenderConfig,
}

impl Config {
    /// Checks values serde cannot check on its own.
    ///
    /// # Errors
    ///
    /// `ValidationError` for an unknown log level or a defaults section
    /// that is not a JSON object.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "unknown log level '{}', expected one of: {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }
        for (section, value) in [
            ("defaults.thermal_tab", &self.defaults.thermal_tab),
            ("defaults.d_pad", &self.defaults.d_pad),
        ] {
            if !(value.is_null() || value.is_object()) {
                return Err(ConfigError::ValidationError {
                    message: format!("{section} must be an object of pad properties"),
                });
            }
        }
        Ok(())
    }
}

/// `logging` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error. Default `warn`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// `defaults` section.
///
/// Each entry is a partial property set in the same camelCase form the
/// tools accept, e.g. `{"padLength": 4.1, "viaLayout": "grid"}`. Values go
/// through the generators' validated setters, so out-of-range numbers are
/// clamped rather than rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    /// Thermal tab properties.
    #[serde(default)]
    pub thermal_tab: Value,

    /// D-shape pad properties.
    #[serde(default)]
    pub d_pad: Value,
}

/// `render` section.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Attach SVG path data to tool results.
    #[serde(default = "default_true")]
    pub include_svg: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            include_svg: default_true(),
        }
    }
}

const fn default_true() -> bool {
    true
}
