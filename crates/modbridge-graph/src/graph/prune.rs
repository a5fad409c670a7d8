//! Module rewriting and the dependant-removal cascade.

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};

use super::super::ModuleId;
use super::super::dedupe::find_dedupe_target;
use super::BundleGraph;
use crate::{Error, Result};

impl BundleGraph {
    /// Replace a record's source and dependency map, then prune every module
    /// that is no longer reachable because of it.
    ///
    /// Every target in `deps` must already be a node of the graph. Returns the
    /// ids removed by the cascade, in removal order.
    pub fn rewrite_module(
        &mut self,
        id: &ModuleId,
        source: String,
        deps: IndexMap<String, ModuleId>,
    ) -> Result<Vec<ModuleId>> {
        if !self.records.contains_key(id) {
            return Err(Error::UnknownModule(id.clone()));
        }
        if let Some(missing) = deps.values().find(|target| !self.nodes.contains_key(*target)) {
            return Err(Error::UnknownModule(missing.clone()));
        }

        let new_alias = find_dedupe_target(&source);
        let Some(record) = self.records.get_mut(id) else {
            return Err(Error::UnknownModule(id.clone()));
        };
        let old_targets: IndexSet<ModuleId> = record.deps.values().cloned().collect();
        let new_targets: IndexSet<ModuleId> = deps.values().cloned().collect();
        record.source = source;
        record.deps = deps;
        record.dedupe = None;

        let mut released = VecDeque::new();

        for target in old_targets.difference(&new_targets) {
            if let Some(node) = self.nodes.get_mut(target) {
                if node.dependants.shift_remove(id) {
                    released.push_back(target.clone());
                }
            }
        }
        for target in new_targets.difference(&old_targets) {
            if let Some(node) = self.nodes.get_mut(target) {
                node.dependants.insert(id.clone());
            }
        }

        let old_alias = match self.nodes.get_mut(id) {
            Some(node) => {
                node.dependencies = new_targets;
                std::mem::replace(&mut node.alias_of, new_alias.clone())
            }
            None => None,
        };
        if old_alias != new_alias {
            if let Some(previous) = old_alias {
                if let Some(node) = self.nodes.get_mut(&previous) {
                    node.aliased_by.shift_remove(id);
                    released.push_back(previous);
                }
            }
            if let Some(next) = new_alias {
                if let Some(node) = self.nodes.get_mut(&next) {
                    node.aliased_by.insert(id.clone());
                }
            }
        }

        let pruned = self.cascade(released);
        self.refresh_names();
        Ok(pruned)
    }

    /// Drop `id` from the dependants of every other node.
    ///
    /// Any node left with no dependants, no live dedupe forwarder and no entry
    /// flag is removed, and the same is done for it in turn. Returns the ids
    /// removed, in removal order.
    pub fn remove_dependant(&mut self, id: &ModuleId) -> Vec<ModuleId> {
        let released = self.release(id);
        let pruned = self.cascade(released);
        self.refresh_names();
        pruned
    }

    /// Returns true if nothing keeps `id` alive.
    pub fn is_removable(&self, id: &ModuleId) -> bool {
        self.nodes.get(id).is_some_and(|node| {
            node.dependants.is_empty() && !node.is_pinned() && !self.entries.contains(id)
        })
    }

    /// Worklist form of the cascade so deep chains do not grow the stack.
    /// Terminates because every iteration that does work removes a node.
    fn cascade(&mut self, mut queue: VecDeque<ModuleId>) -> Vec<ModuleId> {
        let mut pruned = Vec::new();

        while let Some(candidate) = queue.pop_front() {
            if !self.is_removable(&candidate) {
                continue;
            }

            let Some(node) = self.nodes.shift_remove(&candidate) else {
                continue;
            };
            // A dangling target was never a module of the bundle; its node
            // goes without being reported as pruned.
            if !node.has_record {
                continue;
            }
            self.records.shift_remove(&candidate);
            self.removed.insert(candidate.clone());
            tracing::debug!(module = %candidate, "pruned unreachable module");

            // Adjacency is symmetric, so only the removed node's own targets
            // can list it as a dependant or forwarder.
            for target in node.dependencies.iter().chain(node.alias_of.iter()) {
                if let Some(other) = self.nodes.get_mut(target) {
                    let lost_dependant = other.dependants.shift_remove(&candidate);
                    let lost_alias = other.aliased_by.shift_remove(&candidate);
                    if lost_dependant || lost_alias {
                        queue.push_back(target.clone());
                    }
                }
            }
            pruned.push(candidate);
        }

        pruned
    }

    /// Strip `id` from every other node's dependants and dedupe forwarders,
    /// returning the nodes that lost something.
    fn release(&mut self, id: &ModuleId) -> VecDeque<ModuleId> {
        let mut released = VecDeque::new();
        for (other_id, node) in &mut self.nodes {
            if other_id == id {
                continue;
            }
            let lost_dependant = node.dependants.shift_remove(id);
            let lost_alias = node.aliased_by.shift_remove(id);
            if lost_dependant || lost_alias {
                released.push_back(other_id.clone());
            }
        }
        released
    }

    /// Rebuild `known_as` and the name index from the live records.
    fn refresh_names(&mut self) {
        self.names.clear();
        for node in self.nodes.values_mut() {
            node.known_as.clear();
        }
        for record in self.records.values() {
            for (specifier, target) in &record.deps {
                if let Some(node) = self.nodes.get_mut(target) {
                    node.known_as.insert(specifier.clone());
                    self.names
                        .entry(specifier.clone())
                        .or_default()
                        .insert(target.clone());
                }
            }
        }
    }
}
