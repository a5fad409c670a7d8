//! Registry stubs.
//!
//! A stub replaces a bundled module's body with a lookup in the runtime module
//! registry, and its dependencies with the registry client alone. Whatever
//! the module used to depend on is then pruned if nothing else needs it.

use indexmap::{IndexMap, IndexSet};
use modbridge_config::{MappingSet, ModuleMapping};
use modbridge_graph::{BundleGraph, ImportForm, ModuleId, RegistryTarget};
use serde::Serialize;

use crate::Result;
use crate::diagnostics::PipelineWarning;

/// A module replaced by a registry stub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StubbedModule {
    pub id: ModuleId,
    /// Mapping that produced the stub.
    pub from: String,
    /// Registry lookup the stub performs.
    pub import: String,
    /// True when the module was found through a mapping alias.
    pub via_alias: bool,
}

/// What one stubbing pass did.
#[derive(Debug, Clone, Default)]
pub struct StubOutcome {
    pub stubbed: Vec<StubbedModule>,
    pub pruned: Vec<ModuleId>,
    pub warnings: Vec<PipelineWarning>,
}

/// Applies module mappings to a bundle graph.
#[derive(Debug, Clone)]
pub struct StubRewriter {
    client: String,
    import_form: ImportForm,
}

impl StubRewriter {
    pub fn new(client: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            import_form: ImportForm::Qualified,
        }
    }

    pub fn with_import_form(mut self, form: ImportForm) -> Self {
        self.import_form = form;
        self
    }

    pub fn client(&self) -> &str {
        &self.client
    }

    /// Source text of a stub for `target`.
    ///
    /// ```
    /// use modbridge_bundler::StubRewriter;
    /// use modbridge_graph::RegistryTarget;
    ///
    /// let target = RegistryTarget::parse("jquery-detached:jquery2").unwrap();
    /// let source = StubRewriter::new("@jenkins-cd/js-modules").stub_source(&target, false);
    /// assert_eq!(
    ///     source,
    ///     "module.exports = require('@jenkins-cd/js-modules').require('jquery-detached:jquery2');"
    /// );
    /// ```
    pub fn stub_source(&self, target: &RegistryTarget, add_default_css: bool) -> String {
        let mut source = format!(
            "module.exports = require('{}').require('{}');",
            self.client,
            target.import_form(self.import_form)
        );
        if add_default_css {
            let namespace = target.namespace.as_deref().unwrap_or("undefined");
            source.push_str(&format!(
                "\nrequire('{}').addModuleCSSToPage('{namespace}', '{}');",
                self.client, target.module.module_name
            ));
        }
        source
    }

    /// Stub every mapped module of `graph`, in mapping order.
    ///
    /// Only structural graph errors are returned; everything else becomes a
    /// warning in the outcome and leaves the graph untouched for that mapping.
    pub fn apply(&self, graph: &mut BundleGraph, mappings: &MappingSet) -> Result<StubOutcome> {
        let mut outcome = StubOutcome::default();
        if mappings.is_empty() {
            return Ok(outcome);
        }

        let client_id = match graph.nodes_known_as(&self.client).as_slice() {
            [client] => client.id.clone(),
            [] => {
                // Without the client no mapped require made it into the
                // bundle. Only worth a warning if a mapped module did.
                if mappings
                    .iter()
                    .any(|m| !graph.nodes_known_as(m.lookup_name()).is_empty())
                {
                    outcome.warnings.push(
                        PipelineWarning::MissingClient {
                            client: self.client.clone(),
                        }
                        .emit(),
                    );
                } else {
                    tracing::debug!(client = %self.client, "registry client not in bundle, nothing to stub");
                }
                return Ok(outcome);
            }
            candidates => {
                outcome.warnings.push(
                    PipelineWarning::Ambiguous {
                        name: self.client.clone(),
                        candidates: candidates.iter().map(|node| node.id.clone()).collect(),
                    }
                    .emit(),
                );
                return Ok(outcome);
            }
        };

        let mut done: IndexSet<ModuleId> = IndexSet::new();
        for mapping in mappings {
            self.apply_mapping(graph, mapping, &client_id, &mut done, &mut outcome)?;
        }

        tracing::debug!(
            stubbed = outcome.stubbed.len(),
            pruned = outcome.pruned.len(),
            "stubbing pass finished"
        );
        Ok(outcome)
    }

    fn apply_mapping(
        &self,
        graph: &mut BundleGraph,
        mapping: &ModuleMapping,
        client_id: &ModuleId,
        done: &mut IndexSet<ModuleId>,
        outcome: &mut StubOutcome,
    ) -> Result<()> {
        let target = match RegistryTarget::parse(&mapping.to) {
            Ok(target) => target,
            Err(error) => {
                outcome.warnings.push(
                    PipelineWarning::MalformedTarget {
                        from: mapping.from.clone(),
                        to: mapping.to.clone(),
                        error,
                    }
                    .emit(),
                );
                return Ok(());
            }
        };
        let source = self.stub_source(&target, mapping.config.add_default_css);
        let import = target.import_form(self.import_form);

        let name = mapping.lookup_name();
        let found: Vec<ModuleId> = graph
            .nodes_known_as(name)
            .into_iter()
            .map(|node| node.id.clone())
            .collect();
        match found.as_slice() {
            [] => tracing::debug!(name, "mapped module not in bundle"),
            [id] if graph.record(id).is_none() => {
                outcome.warnings.push(
                    PipelineWarning::MissingRecord {
                        name: name.to_string(),
                        id: id.clone(),
                    }
                    .emit(),
                );
            }
            [id] => {
                if self.stub(graph, id, &source, client_id, done, outcome)? {
                    outcome.stubbed.push(StubbedModule {
                        id: id.clone(),
                        from: mapping.from.clone(),
                        import: import.clone(),
                        via_alias: false,
                    });
                }
            }
            candidates => {
                outcome.warnings.push(
                    PipelineWarning::Ambiguous {
                        name: name.to_string(),
                        candidates: candidates.to_vec(),
                    }
                    .emit(),
                );
            }
        }

        for alias in &mapping.config.aliases {
            let id = ModuleId::path(alias.as_str());
            if graph.record(&id).is_none() {
                // Already stubbed or pruned through an earlier mapping is fine.
                if !done.contains(&id) && !graph.was_removed(&id) {
                    outcome.warnings.push(
                        PipelineWarning::AliasNotFound {
                            from: mapping.from.clone(),
                            alias: alias.clone(),
                        }
                        .emit(),
                    );
                }
                continue;
            }
            if self.stub(graph, &id, &source, client_id, done, outcome)? {
                outcome.stubbed.push(StubbedModule {
                    id,
                    from: mapping.from.clone(),
                    import: import.clone(),
                    via_alias: true,
                });
            }
        }

        Ok(())
    }

    /// Rewrite one module into a stub. Returns false if it was skipped.
    fn stub(
        &self,
        graph: &mut BundleGraph,
        id: &ModuleId,
        source: &str,
        client_id: &ModuleId,
        done: &mut IndexSet<ModuleId>,
        outcome: &mut StubOutcome,
    ) -> Result<bool> {
        if id == client_id {
            tracing::debug!(module = %id, "not stubbing the registry client");
            return Ok(false);
        }
        if !done.insert(id.clone()) {
            tracing::debug!(module = %id, "module already stubbed");
            return Ok(false);
        }

        let deps = IndexMap::from([(self.client.clone(), client_id.clone())]);
        let pruned = graph.rewrite_module(id, source.to_string(), deps)?;
        tracing::debug!(module = %id, pruned = pruned.len(), "stubbed module");
        outcome.pruned.extend(pruned);
        Ok(true)
    }
}
