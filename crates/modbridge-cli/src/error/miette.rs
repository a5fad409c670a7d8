//! Miette diagnostic conversion for CLI errors.

use crate::error::CliError;
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        // The bundler error carries its own code and help.
        CliError::Bundler(e) => Report::new(e),
        CliError::Config(e) => match e.hint() {
            Some(hint) => miette::miette!(help = hint.to_string(), "Configuration error: {}", e),
            None => miette::miette!("Configuration error: {}", e),
        },
        CliError::WarningsDenied { .. } => miette::miette!(
            help = "Fix the warnings above or drop --deny-warnings",
            "{}",
            err
        ),
        _ => miette::miette!("{}", err),
    }
}
