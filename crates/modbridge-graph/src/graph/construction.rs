//! Construction methods for BundleGraph.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::super::dedupe::find_dedupe_target;
use super::super::{ModuleId, ModuleNode, ModuleRecord};
use super::BundleGraph;
use crate::{Error, Result};

/// Structurally valid but unusual input noticed during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionAnomaly {
    /// A non-entry record that no other record depends on.
    UnreferencedRecord { id: ModuleId },
    /// More than one record is flagged as the entry point.
    MultipleEntries { ids: Vec<ModuleId> },
}

impl std::fmt::Display for ExtractionAnomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnreferencedRecord { id } => {
                write!(f, "module '{id}' is not an entry point and nothing depends on it")
            }
            Self::MultipleEntries { ids } => {
                let ids: Vec<_> = ids.iter().map(ToString::to_string).collect();
                write!(f, "bundle has {} entry points: {}", ids.len(), ids.join(", "))
            }
        }
    }
}

impl BundleGraph {
    /// Build the graph from the bundler's flat record list.
    ///
    /// Fails only on structurally broken input (a duplicated record id).
    /// Unusual but valid input is logged and kept in [`Self::anomalies`].
    pub fn extract(records: Vec<ModuleRecord>) -> Result<Self> {
        let mut by_id = IndexMap::with_capacity(records.len());
        for record in records {
            if by_id.contains_key(&record.id) {
                return Err(Error::DuplicateModuleId(record.id));
            }
            by_id.insert(record.id.clone(), record);
        }

        let mut graph = Self {
            records: by_id,
            ..Self::default()
        };
        graph.reindex();
        graph.anomalies = graph.detect_anomalies();

        for anomaly in &graph.anomalies {
            tracing::warn!("{anomaly}");
        }
        tracing::debug!(
            records = graph.records.len(),
            nodes = graph.nodes.len(),
            "extracted bundle graph"
        );

        Ok(graph)
    }

    /// Rebuild every derived index from the live records.
    ///
    /// Mutations keep the index current incrementally; this is the wholesale
    /// rebuild used after id rewriting and before consistency checks.
    pub fn reindex(&mut self) {
        self.nodes.clear();
        self.names.clear();
        self.entries.clear();

        // First pass: one node per id, named by every specifier that targets it.
        for record in self.records.values() {
            self.nodes
                .entry(record.id.clone())
                .or_insert_with(|| ModuleNode::new(record.id.clone()))
                .has_record = true;

            for (specifier, target) in &record.deps {
                self.nodes
                    .entry(target.clone())
                    .or_insert_with(|| ModuleNode::new(target.clone()))
                    .known_as
                    .insert(specifier.clone());
                self.names
                    .entry(specifier.clone())
                    .or_default()
                    .insert(target.clone());
            }

            if record.entry {
                self.entries.insert(record.id.clone());
            }
        }

        // Second pass: reverse edges.
        for record in self.records.values() {
            for target in record.deps.values() {
                if let Some(node) = self.nodes.get_mut(target) {
                    node.dependants.insert(record.id.clone());
                }
            }
        }

        // Third pass: forward edges.
        for record in self.records.values() {
            if let Some(node) = self.nodes.get_mut(&record.id) {
                node.dependencies.extend(record.deps.values().cloned());
            }
        }

        // Dedupe pins.
        for record in self.records.values() {
            let alias = record
                .dedupe
                .clone()
                .or_else(|| find_dedupe_target(&record.source));
            let Some(target) = alias else {
                continue;
            };
            if let Some(node) = self.nodes.get_mut(&record.id) {
                node.alias_of = Some(target.clone());
            }
            if let Some(target_node) = self.nodes.get_mut(&target) {
                target_node.aliased_by.insert(record.id.clone());
            }
        }
    }

    fn detect_anomalies(&self) -> Vec<ExtractionAnomaly> {
        let mut anomalies = Vec::new();

        if self.entries.len() > 1 {
            anomalies.push(ExtractionAnomaly::MultipleEntries {
                ids: self.entries.iter().cloned().collect(),
            });
        }

        for record in self.records.values() {
            if record.entry {
                continue;
            }
            let referenced = self
                .nodes
                .get(&record.id)
                .is_some_and(|node| !node.dependants.is_empty() || node.is_pinned());
            if !referenced {
                anomalies.push(ExtractionAnomaly::UnreferencedRecord {
                    id: record.id.clone(),
                });
            }
        }

        anomalies
    }

    /// Anomalies noticed when the graph was extracted.
    pub fn anomalies(&self) -> &[ExtractionAnomaly] {
        &self.anomalies
    }

    /// Consume the graph, returning the live records in input order.
    pub fn into_records(self) -> Vec<ModuleRecord> {
        self.records.into_values().collect()
    }
}
