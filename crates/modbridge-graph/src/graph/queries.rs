//! Query methods for BundleGraph.

use super::super::{ModuleId, ModuleNode, ModuleRecord};
use super::BundleGraph;

impl BundleGraph {
    /// Number of live records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no records survive.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Lookup a node by id.
    pub fn node(&self, id: &ModuleId) -> Option<&ModuleNode> {
        self.nodes.get(id)
    }

    /// Lookup a live record by id.
    pub fn record(&self, id: &ModuleId) -> Option<&ModuleRecord> {
        self.records.get(id)
    }

    /// All nodes in first-seen order.
    pub fn nodes(&self) -> impl Iterator<Item = &ModuleNode> {
        self.nodes.values()
    }

    /// Live records in input order.
    pub fn records(&self) -> impl Iterator<Item = &ModuleRecord> {
        self.records.values()
    }

    /// Nodes known under a declared specifier.
    ///
    /// More than one result means the name is ambiguous: different importers
    /// resolve it to different physical modules.
    pub fn nodes_known_as(&self, name: &str) -> Vec<&ModuleNode> {
        self.names
            .get(name)
            .into_iter()
            .flatten()
            .filter_map(|id| self.nodes.get(id))
            .collect()
    }

    /// Entry point ids.
    pub fn entries(&self) -> impl Iterator<Item = &ModuleId> {
        self.entries.iter()
    }

    /// Returns true if `id` is flagged as an entry point.
    pub fn is_entry(&self, id: &ModuleId) -> bool {
        self.entries.contains(id)
    }

    /// Returns true if a live dedupe marker forwards to `id`.
    pub fn is_pinned(&self, id: &ModuleId) -> bool {
        self.nodes.get(id).is_some_and(ModuleNode::is_pinned)
    }

    /// Ids pruned since extraction, in removal order.
    pub fn removed(&self) -> impl Iterator<Item = &ModuleId> {
        self.removed.iter()
    }

    /// Returns true if `id` was pruned from this graph.
    pub fn was_removed(&self, id: &ModuleId) -> bool {
        self.removed.contains(id)
    }

    /// Direct dependants of `id` (empty for unknown ids).
    pub fn dependants(&self, id: &ModuleId) -> Vec<ModuleId> {
        self.nodes
            .get(id)
            .map(|node| node.dependants.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Direct dependencies of `id` (empty for unknown ids).
    pub fn dependencies(&self, id: &ModuleId) -> Vec<ModuleId> {
        self.nodes
            .get(id)
            .map(|node| node.dependencies.iter().cloned().collect())
            .unwrap_or_default()
    }
}
