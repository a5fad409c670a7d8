//! Check command implementation.
//!
//! Validates configuration without transforming anything.

use modbridge_bundler::{BundleGraph, ImportForm, RegistryTarget, read_bundle};
use modbridge_config::{BridgeConfig, MappingSet, ModuleMapping, validate_mappings};

use crate::cli::CheckArgs;
use crate::commands::utils::{self, ConfigOverrides};
use crate::error::{CliError, Result};
use crate::ui;

/// How one mapping would resolve against a bundle.
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution {
    Found,
    Absent,
    Ambiguous(usize),
}

/// Execute the check command.
///
/// 1. Load and validate configuration, every mapping included
/// 2. Report ignored mappings and version ranges pinned by mappings
/// 3. With `--bundle`, report how each mapping resolves
pub fn execute(args: CheckArgs) -> Result<()> {
    ui::info("Checking configuration...");

    let cwd = utils::get_cwd(args.cwd.as_deref())?;
    let config = utils::load_config(&cwd, args.config.as_deref(), ConfigOverrides::default())?;
    validate_mappings(&config)?;
    ui::success(&format!(
        "Configuration is valid ({})",
        config.registry_id()
    ));

    let mappings = config.effective_mappings();
    for ignored in mappings.ignored() {
        ui::warning(&ignored.to_string());
    }
    if config.import_form == ImportForm::Pinned {
        for mapping in &mappings {
            if pins_range(mapping) {
                ui::warning(&format!(
                    "{} pins a version range; registry lookups match exact versions",
                    mapping.to
                ));
            }
        }
    }
    ui::info(&format!("{} mapping(s) in effect", mappings.len()));

    let Some(bundle) = args.bundle else {
        return Ok(());
    };
    let bundle = utils::resolve_path(&bundle, &cwd);
    if !bundle.is_file() {
        return Err(CliError::FileNotFound(bundle));
    }

    let graph = BundleGraph::extract(read_bundle(&bundle)?).map_err(modbridge_bundler::Error::from)?;
    check_bundle(&config, &mappings, &graph);
    Ok(())
}

fn check_bundle(config: &BridgeConfig, mappings: &MappingSet, graph: &BundleGraph) {
    // Anomalies themselves were logged during extraction.
    ui::info(&format!(
        "Bundle has {} modules, {} entry point(s), {} anomalies",
        graph.len(),
        graph.entries().count(),
        graph.anomalies().len()
    ));

    match resolve(graph, &config.registry_client) {
        Resolution::Found => ui::success(&format!("{} found", config.registry_client)),
        Resolution::Absent => ui::warning(&format!(
            "{} is not in the bundle; nothing will be stubbed",
            config.registry_client
        )),
        Resolution::Ambiguous(n) => ui::warning(&format!(
            "{} resolves to {n} modules; nothing will be stubbed",
            config.registry_client
        )),
    }

    for mapping in mappings {
        let name = mapping.lookup_name();
        match resolve(graph, name) {
            Resolution::Found => ui::success(&format!("  {name} -> {}", mapping.to)),
            Resolution::Absent => ui::info(&format!("  {name} is not in the bundle")),
            Resolution::Ambiguous(n) => {
                ui::warning(&format!("  {name} resolves to {n} modules and will be skipped"))
            }
        }
    }
}

/// True when the target carries a version qualifier that is not exact.
fn pins_range(mapping: &ModuleMapping) -> bool {
    RegistryTarget::parse(&mapping.to)
        .is_ok_and(|target| target.module.version.is_some() && target.exact_version().is_none())
}

pub fn resolve(graph: &BundleGraph, name: &str) -> Resolution {
    match graph.nodes_known_as(name).len() {
        0 => Resolution::Absent,
        1 => Resolution::Found,
        n => Resolution::Ambiguous(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modbridge_bundler::ModuleRecord;

    #[test]
    fn test_resolve_counts_candidates() {
        let graph = BundleGraph::extract(vec![
            ModuleRecord::new(1u64, "")
                .dep("./a", 2u64)
                .dep("./b", 3u64)
                .entry(),
            ModuleRecord::new(2u64, "").dep("./util", 4u64),
            ModuleRecord::new(3u64, "").dep("./util", 5u64),
            ModuleRecord::new(4u64, ""),
            ModuleRecord::new(5u64, ""),
        ])
        .unwrap();

        assert_eq!(resolve(&graph, "./a"), Resolution::Found);
        assert_eq!(resolve(&graph, "./util"), Resolution::Ambiguous(2));
        assert_eq!(resolve(&graph, "jquery"), Resolution::Absent);
    }

    #[test]
    fn test_pins_range() {
        assert!(pins_range(&ModuleMapping::new("react", "react:react@^15.3")));
        assert!(!pins_range(&ModuleMapping::new("react", "react:react@15.3.2")));
        assert!(!pins_range(&ModuleMapping::new("react", "react:react")));
    }
}
