//! Entry point of the `modbridge` binary: argument parsing, logging setup
//! and command dispatch.

use clap::Parser;
use miette::Result;
use modbridge_cli::{cli, commands, error, logger, ui};

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Transform(transform_args) => commands::transform_execute(transform_args),
        cli::Command::Check(check_args) => commands::check_execute(check_args),
    };

    result.map_err(error::cli_error_to_miette)
}
