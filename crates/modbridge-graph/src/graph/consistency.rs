//! Post-hoc consistency check.
//!
//! Problems found here are reported, never repaired. A dangling edge to a
//! module pruned during this run usually means something still required a
//! module the cascade considered unreachable, which is worth surfacing.

use serde::{Deserialize, Serialize};

use super::super::ModuleId;
use super::BundleGraph;

/// A dependency edge whose target has no live record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DanglingEdge {
    pub from: ModuleId,
    pub specifier: String,
    pub to: ModuleId,
    /// The target existed at extraction time and was pruned.
    pub pruned: bool,
}

impl std::fmt::Display for DanglingEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let why = if self.pruned {
            "was pruned"
        } else {
            "has no record"
        };
        write!(
            f,
            "module '{}' requires '{}' as '{}', but that module {why}",
            self.from, self.specifier, self.to
        )
    }
}

/// A dedupe forwarder whose target has no live record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DanglingAlias {
    pub from: ModuleId,
    pub to: ModuleId,
}

impl std::fmt::Display for DanglingAlias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "module '{}' forwards to '{}', which has no record",
            self.from, self.to
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub dangling: Vec<DanglingEdge>,
    pub dangling_aliases: Vec<DanglingAlias>,
    /// `(from, to)` pairs where the forward and reverse index disagree.
    pub asymmetric: Vec<(ModuleId, ModuleId)>,
}

impl ConsistencyReport {
    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty() && self.dangling_aliases.is_empty() && self.asymmetric.is_empty()
    }

    /// Total number of problems found.
    pub fn len(&self) -> usize {
        self.dangling.len() + self.dangling_aliases.len() + self.asymmetric.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_clean()
    }
}

impl BundleGraph {
    /// Verify that every edge of every live record points at a live record,
    /// and that the forward and reverse adjacency agree.
    pub fn check_consistency(&self) -> ConsistencyReport {
        let mut report = ConsistencyReport::default();

        for record in self.records.values() {
            for (specifier, target) in &record.deps {
                if !self.records.contains_key(target) {
                    report.dangling.push(DanglingEdge {
                        from: record.id.clone(),
                        specifier: specifier.clone(),
                        to: target.clone(),
                        pruned: self.removed.contains(target),
                    });
                }
            }

            let alias = self
                .nodes
                .get(&record.id)
                .and_then(|node| node.alias_of.as_ref());
            if let Some(target) = alias {
                if !self.records.contains_key(target) {
                    report.dangling_aliases.push(DanglingAlias {
                        from: record.id.clone(),
                        to: target.clone(),
                    });
                }
            }
        }

        for node in self.nodes.values() {
            for target in &node.dependencies {
                let mirrored = self
                    .nodes
                    .get(target)
                    .is_some_and(|other| other.dependants.contains(&node.id));
                if !mirrored {
                    report.asymmetric.push((node.id.clone(), target.clone()));
                }
            }
            for dependant in &node.dependants {
                let mirrored = self
                    .nodes
                    .get(dependant)
                    .is_some_and(|other| other.dependencies.contains(&node.id));
                if !mirrored {
                    report.asymmetric.push((dependant.clone(), node.id.clone()));
                }
            }
        }

        for problem in &report.dangling {
            tracing::warn!("{problem}");
        }
        for problem in &report.dangling_aliases {
            tracing::warn!("{problem}");
        }
        for (from, to) in &report.asymmetric {
            tracing::warn!(%from, %to, "adjacency index is not symmetric");
        }

        report
    }
}
