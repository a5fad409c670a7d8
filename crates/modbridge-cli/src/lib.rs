//! modbridge CLI - rewrite bundles so shared modules load from the runtime
//! module registry.
//!
//! - [`cli`] - clap definitions
//! - `commands` - `transform` and `check`
//! - [`error`] - error types and miette conversion
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status messages

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result, ResultExt};
