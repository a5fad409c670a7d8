use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::ModuleId;

/// Derived view of one module id within a [`BundleGraph`](crate::BundleGraph).
///
/// Nodes exist for every id that is either a record or the target of a
/// dependency edge. A node without a record is a dangling target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleNode {
    pub id: ModuleId,
    /// Every declared specifier that resolves to this id, across all records.
    /// One relative specifier may name different ids from different importers.
    pub known_as: IndexSet<String>,
    /// Ids of records that depend on this node.
    pub dependants: IndexSet<ModuleId>,
    /// Ids this node depends on.
    pub dependencies: IndexSet<ModuleId>,
    /// The id this module forwards to through a dedupe marker.
    pub alias_of: Option<ModuleId>,
    /// Live modules that forward to this one through a dedupe marker.
    pub aliased_by: IndexSet<ModuleId>,
    /// Whether a record with this id exists.
    pub has_record: bool,
}

impl ModuleNode {
    pub fn new(id: ModuleId) -> Self {
        Self {
            id,
            known_as: IndexSet::new(),
            dependants: IndexSet::new(),
            dependencies: IndexSet::new(),
            alias_of: None,
            aliased_by: IndexSet::new(),
            has_record: false,
        }
    }

    /// Pinned nodes survive pruning even with no ordinary dependants.
    pub fn is_pinned(&self) -> bool {
        !self.aliased_by.is_empty()
    }
}
