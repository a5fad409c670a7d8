#![cfg_attr(docsrs, feature(doc_cfg))]

//! # modbridge-bundler
//!
//! Post-processing of bundler output for the runtime module registry.
//!
//! Selected modules of a built bundle are replaced by stubs that fetch the
//! module from the registry at load time. Whatever only those modules needed
//! is pruned, and the surviving ids are renumbered (or truncated to
//! workspace-relative paths) before the bundle is written with a metadata
//! side-file.
//!
//! ## Quick Start
//!
//! ```
//! use modbridge_bundler::{ModuleRecord, Pipeline, PipelineOptions};
//! use modbridge_config::{BridgeConfig, ModuleMapping};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = BridgeConfig::default();
//! config.bundle.name = "app".into();
//! config.mappings.push(ModuleMapping::new("jquery", "jquery-detached:jquery2"));
//!
//! let records = vec![
//!     ModuleRecord::new("/w/index.js", "require('jquery')")
//!         .dep("jquery", "/w/node_modules/jquery/jquery.js")
//!         .dep("@jenkins-cd/js-modules", "/w/node_modules/@jenkins-cd/js-modules/index.js")
//!         .entry(),
//!     ModuleRecord::new("/w/node_modules/jquery/jquery.js", "/* 80kB */"),
//!     ModuleRecord::new("/w/node_modules/@jenkins-cd/js-modules/index.js", ""),
//! ];
//!
//! let options = PipelineOptions::from_config(&config, "/w".as_ref());
//! let output = Pipeline::new(options).run(records)?;
//! assert_eq!(output.report.stubbed, 1);
//! assert_eq!(output.metadata.registry_id, "undefined:app");
//! # Ok(()) }
//! ```

// Re-export everything from foundation crate
pub use modbridge_graph::*;

pub mod diagnostics;
pub mod io;
pub mod output;
pub mod pipeline;
pub mod provenance;
pub mod stub;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

pub use diagnostics::PipelineWarning;
pub use io::{
    parse_bundle, read_bundle, serialize_bundle, write_bundle, write_file, write_files,
};
pub use output::{BundleMetadata, PackMetadata, write_metadata};
pub use pipeline::{Pipeline, PipelineOptions, PipelineOutput, PipelineReport};
pub use provenance::{
    FsPackageResolver, ModuleProvenance, NoopResolver, PackageInfo, PackageResolver,
};
pub use stub::{StubOutcome, StubRewriter, StubbedModule};

/// Error types for modbridge-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input is not a bundle (a JSON array of module records).
    #[error("Invalid bundle: {0}")]
    InvalidBundle(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    Config(#[from] modbridge_config::ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error with context message.
    #[error("{message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid output path (e.g., a path that is a directory).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// File write operation failed.
    #[error("Write failure: {0}")]
    WriteFailure(String),

    /// A file is larger than we are willing to read.
    #[error("File too large: {path} ({size} bytes exceeds limit of {max_size} bytes)")]
    FileTooLarge {
        path: String,
        size: u64,
        max_size: u64,
    },

    /// Error from the graph crate.
    #[error("Graph error: {0}")]
    Graph(#[from] modbridge_graph::Error),
}

/// Result type alias for modbridge-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Error::IoError {
            message: message.into(),
            source,
        }
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::InvalidBundle(_) => "INVALID_BUNDLE",
            Error::Config(_) => "INVALID_CONFIG",
            Error::Io(_) | Error::IoError { .. } => "IO_ERROR",
            Error::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
            Error::WriteFailure(_) => "WRITE_FAILURE",
            Error::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Error::Graph(_) => "GRAPH_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::InvalidBundle(_) => Some(Box::new(
                "Expected a JSON array of module records: [{ \"id\", \"source\", \"deps\", \"entry\"? }]",
            )),
            Error::Config(err) => err
                .hint()
                .map(|hint| Box::new(hint.to_string()) as Box<dyn std::fmt::Display>),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{path}' is invalid. Point it at a file, not a directory."
            ))),
            Error::WriteFailure(msg) => Some(Box::new(format!(
                "Failed to write file. Check disk space and permissions.\nError: {msg}"
            ))),
            Error::Graph(modbridge_graph::Error::IdCollision { .. }) => Some(Box::new(
                "Two module paths truncate to the same id. Use numeric ids or a different workspace root.",
            )),
            Error::Graph(modbridge_graph::Error::DuplicateModuleId(_)) => Some(Box::new(
                "The bundle contains the same module id twice; regenerate it with the bundler.",
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic;

    #[test]
    fn errors_carry_codes_and_help() {
        let err = Error::Graph(modbridge_graph::Error::IdCollision { id: "a.js".into() });
        assert_eq!(err.code().unwrap().to_string(), "GRAPH_ERROR");
        assert!(err.help().is_some());

        let err = Error::InvalidBundle("expected array".into());
        assert_eq!(err.to_string(), "Invalid bundle: expected array");
        assert_eq!(err.severity(), Some(miette::Severity::Error));
    }
}
