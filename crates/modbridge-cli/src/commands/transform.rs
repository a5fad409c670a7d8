//! Transform command implementation.

use std::path::Path;

use modbridge_bundler::{Pipeline, PipelineOptions, read_bundle, serialize_bundle, write_files};

use crate::cli::TransformArgs;
use crate::commands::utils::{self, BundleOverrides, ConfigOverrides, OutputOverrides};
use crate::error::{CliError, Result, ResultExt};
use crate::ui;

/// Execute the transform command.
///
/// 1. Load configuration (file, environment, flags) and validate it
/// 2. Read the input bundle
/// 3. Run the pipeline
/// 4. Write bundle and metadata together, unless `--deny-warnings` trips
pub fn execute(args: TransformArgs) -> Result<()> {
    let cwd = utils::get_cwd(args.cwd.as_deref())?;
    let config = utils::load_config(&cwd, args.config.as_deref(), overrides(&args))?;

    let input = utils::resolve_path(&args.input, &cwd);
    if !input.is_file() {
        return Err(CliError::FileNotFound(input));
    }
    let records = read_bundle(&input)?;
    tracing::debug!(path = %input.display(), records = records.len(), "read bundle");

    let options = PipelineOptions::from_config(&config, &cwd);
    let output = Pipeline::new(options).run(records)?;

    // Warnings were already logged by the pipeline as they were found.
    if args.deny_warnings && output.report.has_warnings() {
        return Err(CliError::WarningsDenied {
            count: output.report.warnings.len(),
        });
    }

    // Bundle and metadata land together or not at all.
    let bundle_path = utils::resolve_path(
        &args.output.clone().unwrap_or_else(|| config.bundle_path()),
        &cwd,
    );
    let bundle_json = serialize_bundle(&output.records, config.output.pretty)?;
    let mut files = vec![(bundle_path.clone(), bundle_json)];
    if !args.no_metadata {
        let metadata_path = utils::resolve_path(&config.metadata_path(), &cwd);
        files.push((metadata_path, output.metadata.to_json(true)?));
    }
    let staged: Vec<(&Path, &[u8])> = files
        .iter()
        .map(|(path, json)| (path.as_path(), json.as_bytes()))
        .collect();
    write_files(&staged)?;

    if args.json {
        let report = serde_json::to_string_pretty(&output.report).context("Failed to encode report")?;
        println!("{report}");
    } else {
        ui::print_summary(&output.report);
    }
    ui::success(&format!(
        "Wrote {} ({})",
        bundle_path.display(),
        config.registry_id()
    ));
    Ok(())
}

fn overrides(args: &TransformArgs) -> ConfigOverrides {
    ConfigOverrides {
        bundle: BundleOverrides {
            name: args.name.clone(),
            namespace: args.namespace.clone(),
        },
        full_paths: args.full_paths.then_some(true),
        output: OutputOverrides {
            out_dir: args.out_dir.clone(),
            metadata_file: args.metadata.clone(),
            pretty: args.pretty.then_some(true),
        },
    }
}
