//! Error types.
//!
//! The geometry generators never fail: they clamp or ignore bad input. The
//! only fallible surface outside the protocol layer is configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration loading failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// File path.
        path: PathBuf,
        /// Cause.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON or does not match the schema.
    #[error("failed to parse configuration file {path}: {source}")]
    ParseError {
        /// File path.
        path: PathBuf,
        /// Cause.
        #[source]
        source: serde_json::Error,
    },

    /// An explicitly requested file does not exist.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// File path.
        path: PathBuf,
    },

    /// A value is out of its allowed set.
    #[error("invalid configuration: {message}")]
    ValidationError {
        /// What is wrong.
        message: String,
    },
}
