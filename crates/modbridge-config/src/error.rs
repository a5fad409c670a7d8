//! Error types for configuration loading and validation.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Config parsing/loading errors
    #[error("config not found")]
    NotFound,

    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("unsupported configuration format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("invalid config value for '{field}'")]
    InvalidValue { field: String, hint: Option<String> },

    // Schema validation errors (no filesystem checks)
    #[error("bundle name is not set")]
    MissingBundleName,

    #[error("invalid module mapping '{from}' -> '{to}': {message}")]
    InvalidMapping {
        from: String,
        to: String,
        message: String,
    },

    #[error("schema validation failed: {message}")]
    SchemaValidation {
        message: String,
        hint: Option<String>,
    },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Suggested fix, when one is known.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::NotFound => Some("Create modbridge.toml or add a \"modbridge\" field to package.json"),
            Self::MissingBundleName => Some("Set [bundle] name, or pass --name"),
            Self::InvalidValue { hint, .. } | Self::SchemaValidation { hint, .. } => hint.as_deref(),
            _ => None,
        }
    }
}
