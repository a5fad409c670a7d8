//! # modbridge-graph
//!
//! Pure graph surgery over the flat module records a browserify-style bundler
//! emits.
//!
//! A bundle is a list of `{ id, source, deps, entry? }` records. This crate
//! rebuilds the dependency graph from that list, lets callers rewrite a
//! module's body and dependencies, prunes everything the rewrite made
//! unreachable, and finally reassigns public ids. It performs no I/O.
//!
//! ## Overview
//!
//! - [`BundleGraph::extract`] - build the graph (nodes, `known_as` names,
//!   dependants/dependencies, dedupe pins)
//! - [`BundleGraph::rewrite_module`] / [`BundleGraph::remove_dependant`] -
//!   mutate and cascade-prune
//! - [`BundleGraph::check_consistency`] - report dangling edges
//! - [`BundleGraph::apply_id_mode`] - renumber or truncate ids
//! - [`specifier`] - parse `pkg@1.2.3/sub` and `ns:pkg@1.2.3` forms
//!
//! ## Example
//!
//! ```rust
//! use modbridge_graph::{BundleGraph, IdMode, ModuleId, ModuleRecord};
//! use indexmap::IndexMap;
//!
//! # fn main() -> modbridge_graph::Result<()> {
//! let mut graph = BundleGraph::extract(vec![
//!     ModuleRecord::new(1u64, "require('a')").dep("a", 2u64).entry(),
//!     ModuleRecord::new(2u64, "module.exports = 1;"),
//! ])?;
//!
//! let pruned = graph.rewrite_module(&ModuleId::Index(1), String::new(), IndexMap::new())?;
//! assert_eq!(pruned, vec![ModuleId::Index(2)]);
//!
//! graph.apply_id_mode(&IdMode::Renumber)?;
//! assert!(graph.check_consistency().is_clean());
//! # Ok(())
//! # }
//! ```
//!
//! ## Dedupe markers
//!
//! The bundler collapses byte-identical modules into a forwarder whose body
//! refers to the kept module by id. The kept module is pinned for as long as
//! a forwarder to it is live, even with no ordinary dependants.

pub mod dedupe;
mod graph;
pub mod module_id;
pub mod node;
pub mod record;
pub mod renumber;
pub mod specifier;

pub use dedupe::{dedupe_marker, find_dedupe_target, find_dedupe_targets, rewrite_dedupe_targets};
pub use graph::{BundleGraph, ConsistencyReport, DanglingAlias, DanglingEdge, ExtractionAnomaly};
pub use module_id::ModuleId;
pub use node::ModuleNode;
pub use record::ModuleRecord;
pub use renumber::{IdMapping, IdMode};
pub use specifier::{ImportForm, ModuleSpec, RegistryTarget, SpecifierError, Version};

/// Errors raised by graph operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two records share an id.
    #[error("duplicate module id '{0}' in bundle")]
    DuplicateModuleId(ModuleId),

    /// An operation named an id that has no node (or no record).
    #[error("unknown module '{0}'")]
    UnknownModule(ModuleId),

    /// Two distinct ids were assigned the same public id.
    #[error("id rewriting maps two modules to '{id}'")]
    IdCollision { id: ModuleId },

    /// Malformed module specifier.
    #[error(transparent)]
    Specifier(#[from] SpecifierError),
}

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests;
