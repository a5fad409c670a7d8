//! The bundle post-processing pipeline.
//!
//! One run takes the bundler's records through: graph extraction, registry
//! stubbing (which prunes as it goes), a consistency check, provenance
//! collection, and id renumbering. Nothing outlives a run except the options
//! it was created with.

use std::path::{Path, PathBuf};

use modbridge_config::{BridgeConfig, MappingSet};
use serde::Serialize;

use crate::diagnostics::PipelineWarning;
use crate::output::BundleMetadata;
use crate::provenance::{self, FsPackageResolver, PackageResolver};
use crate::stub::{StubRewriter, StubbedModule};
use crate::{BundleGraph, IdMapping, IdMode, ImportForm, ModuleId, ModuleRecord, Result};

/// Everything a run needs, resolved from configuration.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub mappings: MappingSet,
    pub registry_client: String,
    pub import_form: ImportForm,
    pub id_mode: IdMode,
    pub registry_id: String,
    pub host_plugin_id: Option<String>,
    pub workspace_root: PathBuf,
}

impl PipelineOptions {
    /// Resolve options from `config`; relative paths are taken against `base`.
    pub fn from_config(config: &BridgeConfig, base: &Path) -> Self {
        let workspace_root = config.workspace_root_or(base);
        Self {
            mappings: config.effective_mappings(),
            registry_client: config.registry_client.clone(),
            import_form: config.import_form,
            id_mode: IdMode::from_full_paths(config.full_paths, workspace_root.clone()),
            registry_id: config.registry_id(),
            host_plugin_id: config.bundle.host_plugin_id.clone(),
            workspace_root,
        }
    }
}

/// Counts and findings of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    pub records_in: usize,
    pub records_out: usize,
    pub stubbed: usize,
    pub pruned: usize,
    pub renumbered: usize,
    pub stubs: Vec<StubbedModule>,
    pub pruned_ids: Vec<ModuleId>,
    pub warnings: Vec<PipelineWarning>,
}

impl PipelineReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub records: Vec<ModuleRecord>,
    pub metadata: BundleMetadata,
    pub report: PipelineReport,
    /// Old id -> written id, for re-keying side data such as source maps.
    pub id_mapping: IdMapping,
}

pub struct Pipeline {
    options: PipelineOptions,
    resolver: Box<dyn PackageResolver>,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            resolver: Box::new(FsPackageResolver::new()),
        }
    }

    /// Replace the package resolver used for provenance.
    pub fn with_resolver(mut self, resolver: Box<dyn PackageResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Transform one bundle.
    ///
    /// Recoverable problems end up in `report.warnings`; an `Err` means the
    /// input was structurally broken and nothing should be written.
    pub fn run(&mut self, records: Vec<ModuleRecord>) -> Result<PipelineOutput> {
        let span = tracing::info_span!("pipeline", bundle = %self.options.registry_id);
        let _guard = span.enter();

        let mut report = PipelineReport {
            records_in: records.len(),
            ..Default::default()
        };

        report.warnings.extend(
            self.options
                .mappings
                .ignored()
                .iter()
                .cloned()
                .map(PipelineWarning::IgnoredMapping),
        );

        let mut graph = BundleGraph::extract(records)?;
        report.warnings.extend(
            graph
                .anomalies()
                .iter()
                .cloned()
                .map(PipelineWarning::Anomaly),
        );

        let outcome = StubRewriter::new(self.options.registry_client.as_str())
            .with_import_form(self.options.import_form)
            .apply(&mut graph, &self.options.mappings)?;
        report.stubbed = outcome.stubbed.len();
        report.pruned = outcome.pruned.len();
        report.stubs = outcome.stubbed;
        report.pruned_ids = outcome.pruned;
        report.warnings.extend(outcome.warnings);

        let consistency = graph.check_consistency();
        report
            .warnings
            .extend(consistency.dangling.into_iter().map(PipelineWarning::DanglingEdge));
        report.warnings.extend(
            consistency
                .dangling_aliases
                .into_iter()
                .map(PipelineWarning::DanglingAlias),
        );

        // Provenance needs the original path ids, so it runs before renumbering.
        let (mut modules, provenance_warnings) = provenance::collect(
            &graph,
            self.resolver.as_mut(),
            &self.options.workspace_root,
        );
        report.warnings.extend(provenance_warnings);

        let id_mapping = graph.apply_id_mode(&self.options.id_mode)?;
        provenance::rekey(&mut modules, &id_mapping);
        report.renumbered = id_mapping.len();

        let records = graph.into_records();
        report.records_out = records.len();

        let metadata = BundleMetadata::new(self.options.registry_id.clone(), modules)
            .with_host_plugin_id(self.options.host_plugin_id.clone());

        tracing::info!(
            records_in = report.records_in,
            records_out = report.records_out,
            stubbed = report.stubbed,
            pruned = report.pruned,
            renumbered = report.renumbered,
            warnings = report.warnings.len(),
            "bundle transformed"
        );

        Ok(PipelineOutput {
            records,
            metadata,
            report,
            id_mapping,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provenance::NoopResolver;
    use modbridge_config::ModuleMapping;

    fn options(mappings: Vec<ModuleMapping>) -> PipelineOptions {
        let mut config = BridgeConfig::default();
        config.bundle.name = "app".into();
        config.mappings = mappings;
        PipelineOptions::from_config(&config, Path::new("/w"))
    }

    #[test]
    fn ignored_mappings_surface_as_warnings() {
        let opts = options(vec![
            ModuleMapping::new("a", "ns:a"),
            ModuleMapping::new("a", "ns:other"),
        ]);
        let output = Pipeline::new(opts)
            .with_resolver(Box::new(NoopResolver))
            .run(vec![ModuleRecord::new(1u64, "").entry()])
            .unwrap();

        assert!(matches!(
            output.report.warnings.as_slice(),
            [PipelineWarning::IgnoredMapping(_)]
        ));
    }

    #[test]
    fn duplicate_ids_fail_the_run() {
        let result = Pipeline::new(options(vec![]))
            .with_resolver(Box::new(NoopResolver))
            .run(vec![ModuleRecord::new(1u64, ""), ModuleRecord::new(1u64, "")]);
        assert!(matches!(
            result,
            Err(crate::Error::Graph(modbridge_graph::Error::DuplicateModuleId(_)))
        ));
    }
}
