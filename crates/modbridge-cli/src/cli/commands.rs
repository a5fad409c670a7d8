use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::validation::{parse_bundle_name, parse_namespace};

/// Available modbridge subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rewrite a bundle for the runtime registry
    ///
    /// Reads the bundler's JSON module list, stubs every mapped module,
    /// prunes what became unreachable, finalises module ids, and writes the
    /// bundle together with its metadata side-file.
    Transform(TransformArgs),

    /// Validate configuration
    ///
    /// Loads and validates the configuration. Given a bundle, also reports
    /// how each mapping would resolve without writing anything.
    Check(CheckArgs),
}

/// Arguments for the transform command
#[derive(Args, Debug)]
pub struct TransformArgs {
    /// Bundle to transform (JSON array of module records)
    #[arg(value_name = "BUNDLE")]
    pub input: PathBuf,

    /// Configuration file (default: modbridge.toml or package.json "modbridge")
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Project directory; configuration and relative paths resolve against it
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Bundle name (overrides bundle.name)
    #[arg(short, long, value_parser = parse_bundle_name)]
    pub name: Option<String>,

    /// Registry namespace (overrides bundle.namespace)
    #[arg(long, value_parser = parse_namespace)]
    pub namespace: Option<String>,

    /// Output directory (overrides output.out_dir)
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Write the bundle here instead of <out_dir>/<name>.json
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write metadata here instead of <out_dir>/<name>.metadata.json
    #[arg(long, value_name = "FILE", conflicts_with = "no_metadata")]
    pub metadata: Option<PathBuf>,

    /// Do not write the metadata side-file
    #[arg(long)]
    pub no_metadata: bool,

    /// Keep workspace-relative path ids instead of renumbering
    #[arg(long)]
    pub full_paths: bool,

    /// Pretty-print the bundle JSON
    #[arg(long)]
    pub pretty: bool,

    /// Fail without writing if the run reports warnings
    #[arg(long)]
    pub deny_warnings: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Configuration file (default: modbridge.toml or package.json "modbridge")
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Project directory
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Bundle to check the mappings against
    #[arg(short, long, value_name = "BUNDLE")]
    pub bundle: Option<PathBuf>,
}
