//! Command-line interface definition for modbridge.
//!
//! - `modbridge transform` - rewrite a bundle and write it with its metadata
//! - `modbridge check` - validate configuration, optionally against a bundle

mod commands;
mod validation;

use clap::Parser;

pub use commands::{CheckArgs, Command, TransformArgs};
pub use validation::{parse_bundle_name, parse_namespace};

/// modbridge - load shared modules from the runtime registry
#[derive(Parser, Debug)]
#[command(
    name = "modbridge",
    version,
    about = "Rewrite bundles to load shared modules from the runtime registry",
    long_about = "modbridge post-processes the flat module list a bundler emits.\n\
                  Mapped modules become stubs that fetch the module from the runtime\n\
                  registry, anything only they needed is pruned, and module ids are\n\
                  renumbered before the bundle and its metadata are written."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Shows every stubbing and pruning decision.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
