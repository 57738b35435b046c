//! Configuration sources for Waymark.
//!
//! Components read their settings through the [`ConfigSource`] trait, which
//! exposes named string and integer values grouped into sections. Two sources
//! are provided:
//!
//! - [`YamlConfig`]: a YAML document of `section -> key -> scalar`, with
//!   `${VAR}` expansion and `WAYMARK__<SECTION>__<KEY>` overrides
//! - [`MemoryConfig`]: an in-memory builder, handy for embedding and tests

pub mod env;
pub mod source;
pub mod yaml;

pub use env::*;
pub use source::*;
pub use yaml::*;

use std::path::PathBuf;
use thiserror::Error;

/// Config loading and lookup errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("missing required setting {section}.{key}")]
    Missing { section: String, key: String },

    #[error("invalid value for {section}.{key}: {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },
}

impl ConfigError {
    /// Create an invalid-value error.
    pub fn invalid(section: &str, key: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            message: message.into(),
        }
    }
}
