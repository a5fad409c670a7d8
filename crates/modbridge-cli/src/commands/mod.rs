//! Command implementations for the modbridge CLI.
//!
//! - [`transform`] - Rewrite a bundle and write it with its metadata
//! - [`check`] - Configuration validation
//!
//! Each command provides an `execute` function that takes the parsed
//! arguments and returns a Result.

pub mod check;
pub mod transform;
pub(crate) mod utils;

pub use check::execute as check_execute;
pub use transform::execute as transform_execute;
