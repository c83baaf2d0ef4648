//! Configuration file loading.
//!
//! The file is optional. Lookup order:
//!
//! 1. the path given on the command line, which must exist;
//! 2. `~/.padstack-mcp/config.json` (`%USERPROFILE%\.padstack-mcp\config.json`
//!    on Windows), used only if present.
//!
//! Without a file the built-in defaults apply.

mod settings;

pub use settings::{Config, DefaultsConfig, LoggingConfig, RenderConfig};

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// `~/.padstack-mcp/`
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".padstack-mcp"))
}

/// `~/.padstack-mcp/config.json`
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|dir| dir.join("config.json"))
}

/// Loads and validates the configuration.
///
/// With `path == None` a missing default file is not an error and yields
/// [`Config::default`].
///
/// # Errors
///
/// `NotFound` if an explicit `path` does not exist, `ReadError` or
/// `ParseError` if the file cannot be read or decoded, `ValidationError`
/// for bad values.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = match path {
        Some(p) if !p.exists() => {
            return Err(ConfigError::NotFound {
                path: p.to_path_buf(),
            })
        }
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => return Ok(Config::default()),
        },
    };

    let contents = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::ReadError {
        path: config_path.clone(),
        source,
    })?;
    let config: Config =
        serde_json::from_str(&contents).map_err(|source| ConfigError::ParseError {
            path: config_path,
            source,
        })?;
    config.validate()?;
    Ok(config)
}
