//! Logging setup for the modbridge CLI.
//!
//! Pipeline warnings are `tracing` events, so the level chosen here decides
//! whether they show up on stderr.
//!
//! ```rust,no_run
//! use modbridge_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("transforming bundle");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const CRATES: [&str; 4] = [
    "modbridge_graph",
    "modbridge_config",
    "modbridge_bundler",
    "modbridge_cli",
];

/// Filter directives for `level` on every modbridge crate.
fn directives(level: &str) -> String {
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Pick the filter for the global flags.
///
/// `--verbose` wins over `RUST_LOG`, `--quiet` keeps errors only, otherwise
/// `RUST_LOG` applies and falls back to info.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(directives("debug"))
    } else if quiet {
        EnvFilter::new(directives("error"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives("info")))
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .with_writer(std::io::stderr)
        .without_time()
        .compact();

    tracing_subscriber::registry()
        .with(filter_for(verbose, quiet))
        .with(fmt_layer)
        .init();
}

/// Whether stderr should get ANSI colours.
///
/// `NO_COLOR` disables and `FORCE_COLOR` forces them; otherwise the terminal
/// decides.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::Term::stderr().features().colors_supported()
}
