//! Final id assignment.
//!
//! Bundles are assembled with absolute-path ids. Before they ship, ids are
//! either replaced by small sequential integers or, when full paths are kept,
//! truncated to workspace-relative paths so no machine-specific prefix leaks
//! into the output.

use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;
use path_clean::PathClean;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::dedupe::{find_dedupe_targets, rewrite_dedupe_targets};
use crate::{BundleGraph, Error, ModuleId, Result};

/// How public ids are finalised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdMode {
    /// Sequential integers from 1, in record order.
    Renumber,
    /// Absolute-path ids under `root` become paths relative to it.
    Truncate { root: PathBuf },
}

impl IdMode {
    /// `full_paths` keeps (truncated) path ids; otherwise ids are renumbered.
    pub fn from_full_paths(full_paths: bool, root: impl Into<PathBuf>) -> Self {
        if full_paths {
            Self::Truncate { root: root.into() }
        } else {
            Self::Renumber
        }
    }
}

/// Old id -> new id for every id that changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdMapping {
    changed: IndexMap<ModuleId, ModuleId>,
}

impl IdMapping {
    /// The new id for `old`, or `None` if it was left as is.
    pub fn get(&self, old: &ModuleId) -> Option<&ModuleId> {
        self.changed.get(old)
    }

    /// The id `old` is known by after the mapping was applied.
    pub fn resolve(&self, old: &ModuleId) -> ModuleId {
        self.changed.get(old).cloned().unwrap_or_else(|| old.clone())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ModuleId, &ModuleId)> {
        self.changed.iter()
    }

    /// Number of ids that changed.
    pub fn len(&self) -> usize {
        self.changed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }
}

impl BundleGraph {
    /// Rewrite every record id, dependency value, explicit `dedupe` field and
    /// dedupe marker according to `mode`, then rebuild the index.
    ///
    /// The set of removed ids keeps the pre-mapping ids.
    pub fn apply_id_mode(&mut self, mode: &IdMode) -> Result<IdMapping> {
        let assigned = match mode {
            IdMode::Renumber => self.sequential_ids(),
            IdMode::Truncate { root } => self.truncated_ids(&root.clean()),
        };
        let mapping = finalize(assigned)?;
        if mapping.is_empty() {
            return Ok(mapping);
        }

        let records = std::mem::take(&mut self.records);
        for (_, mut record) in records {
            record.id = mapping.resolve(&record.id);
            for target in record.deps.values_mut() {
                *target = mapping.resolve(target);
            }
            if let Some(dedupe) = record.dedupe.as_mut() {
                *dedupe = mapping.resolve(dedupe);
            }
            let rewritten = rewrite_dedupe_targets(&record.source, |old| mapping.get(old).cloned());
            if let std::borrow::Cow::Owned(source) = rewritten {
                record.source = source;
            }
            self.records.insert(record.id.clone(), record);
        }

        self.reindex();
        tracing::debug!(changed = mapping.len(), "rewrote module ids");
        Ok(mapping)
    }

    /// Every id mentioned by a live record: record ids first, then dependency
    /// and dedupe targets that have no record.
    fn referenced_ids(&self) -> Vec<ModuleId> {
        let mut ids: Vec<ModuleId> = self.records.keys().cloned().collect();
        let mut seen: FxHashSet<ModuleId> = ids.iter().cloned().collect();
        for record in self.records.values() {
            let markers = find_dedupe_targets(&record.source);
            let targets = record
                .deps
                .values()
                .cloned()
                .chain(record.dedupe.clone())
                .chain(markers);
            for target in targets {
                if seen.insert(target.clone()) {
                    ids.push(target);
                }
            }
        }
        ids
    }

    fn sequential_ids(&self) -> Vec<(ModuleId, ModuleId)> {
        self.referenced_ids()
            .into_iter()
            .zip(1u64..)
            .map(|(old, index)| (old, ModuleId::Index(index)))
            .collect()
    }

    fn truncated_ids(&self, root: &Path) -> Vec<(ModuleId, ModuleId)> {
        self.referenced_ids()
            .into_iter()
            .map(|old| {
                let new = truncate(&old, root).unwrap_or_else(|| old.clone());
                (old, new)
            })
            .collect()
    }
}

/// Workspace-relative form of an absolute path id under `root`.
fn truncate(id: &ModuleId, root: &Path) -> Option<ModuleId> {
    if !id.is_absolute_path() {
        return None;
    }
    let path = id.as_path()?.clean();
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    Some(ModuleId::Path(parts.join("/")))
}

/// Check the assignment is injective and keep only the ids that change.
fn finalize(assigned: Vec<(ModuleId, ModuleId)>) -> Result<IdMapping> {
    let mut taken = FxHashSet::default();
    let mut changed = IndexMap::new();
    for (old, new) in assigned {
        if !taken.insert(new.clone()) {
            return Err(Error::IdCollision { id: new });
        }
        if old != new {
            changed.insert(old, new);
        }
    }
    Ok(IdMapping { changed })
}
