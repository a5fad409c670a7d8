//! Error types for the modbridge CLI.
//!
//! Library errors convert into [`CliError`] through `#[from]`; `main` turns
//! the result into a `miette` report (see [`miette`]).

use std::path::PathBuf;
use thiserror::Error;

pub mod miette;

pub use self::miette::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Loading or validating configuration failed
    #[error("Configuration error: {0}")]
    Config(#[from] modbridge_config::ConfigError),

    /// The pipeline or bundle I/O failed
    #[error(transparent)]
    Bundler(#[from] modbridge_bundler::Error),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `--deny-warnings` was given and the run produced warnings
    #[error("{count} warning(s) reported and --deny-warnings is set; nothing was written")]
    WarningsDenied { count: usize },

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Prefix the error message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_error_from_config_error() {
        let cli_err: CliError = modbridge_config::ConfigError::MissingBundleName.into();
        assert!(matches!(cli_err, CliError::Config(_)));
        assert!(cli_err.to_string().contains("bundle name is not set"));
    }

    #[test]
    fn test_result_ext_with_path() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));

        let err = result.with_path("/test/bundle.json").unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }

    #[test]
    fn test_result_ext_context() {
        let result: std::result::Result<(), CliError> =
            Err(CliError::InvalidArgument("--name".into()));

        let err = result.context("Failed to load configuration").unwrap_err();
        assert!(err.to_string().starts_with("Failed to load configuration: "));
    }

    #[test]
    fn test_warnings_denied_message() {
        let err = CliError::WarningsDenied { count: 2 };
        assert!(err.to_string().contains("2 warning(s)"));
    }
}
