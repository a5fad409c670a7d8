//! In-memory bundle graph.
//!
//! The graph owns the live module records and an adjacency index derived from
//! them. Methods are split by concern:
//!
//! - `construction` - extraction from records, wholesale re-indexing
//! - `queries` - lookups by id and by declared name
//! - `prune` - module rewriting and the dependant-removal cascade
//! - `consistency` - post-hoc dangling edge / symmetry check

mod consistency;
mod construction;
mod prune;
mod queries;

use indexmap::{IndexMap, IndexSet};

use super::{ModuleId, ModuleNode, ModuleRecord};

pub use consistency::{ConsistencyReport, DanglingAlias, DanglingEdge};
pub use construction::ExtractionAnomaly;

/// Module graph rebuilt from one bundle snapshot.
///
/// Single-threaded by construction: every mutation takes `&mut self`, and each
/// pipeline run owns its own graph.
#[derive(Debug, Clone, Default)]
pub struct BundleGraph {
    /// Live records in input order.
    pub(crate) records: IndexMap<ModuleId, ModuleRecord>,
    /// Nodes in first-seen order.
    pub(crate) nodes: IndexMap<ModuleId, ModuleNode>,
    /// Declared specifier -> ids known under it.
    pub(crate) names: IndexMap<String, IndexSet<ModuleId>>,
    pub(crate) entries: IndexSet<ModuleId>,
    /// Ids pruned since extraction, in removal order.
    pub(crate) removed: IndexSet<ModuleId>,
    pub(crate) anomalies: Vec<ExtractionAnomaly>,
}
