//! Package provenance of bundled modules.
//!
//! Before ids are renumbered they are still filesystem paths, which is the
//! last point where a module can be traced back to the npm package that
//! shipped it. The pipeline records that here and re-keys it by the final id.

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::diagnostics::PipelineWarning;
use crate::{BundleGraph, Error, IdMapping, ModuleId, Result};

/// Maximum allowed size for package.json files (10MB)
const MAX_PACKAGE_JSON_SIZE: u64 = 10 * 1024 * 1024;

/// The parts of a `package.json` that end up in the metadata file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PackageInfo {
    pub name: Option<String>,
    pub version: Option<String>,
    #[serde(default, deserialize_with = "repository_url")]
    pub repository: Option<String>,
}

/// `repository` is either a plain string or `{ "type", "url" }`.
fn repository_url<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repository {
        Url(String),
        Object { url: Option<String> },
        Other(serde_json::Value),
    }

    Ok(match Option::<Repository>::deserialize(deserializer)? {
        Some(Repository::Url(url)) => Some(url),
        Some(Repository::Object { url }) => url,
        Some(Repository::Other(_)) | None => None,
    })
}

/// Finds the package that owns a module file.
pub trait PackageResolver {
    /// Package info for the file at `module_path`, or `None` if no
    /// `package.json` owns it.
    fn resolve(&mut self, module_path: &Path) -> Result<Option<PackageInfo>>;
}

/// Resolver that never finds anything. Used when provenance is not wanted.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopResolver;

impl PackageResolver for NoopResolver {
    fn resolve(&mut self, _module_path: &Path) -> Result<Option<PackageInfo>> {
        Ok(None)
    }
}

/// Walks up from a module file to the nearest `package.json`.
///
/// Results are cached per directory, so a bundle with hundreds of files from
/// the same package reads its `package.json` once.
#[derive(Debug, Default)]
pub struct FsPackageResolver {
    cache: FxHashMap<PathBuf, Option<PackageInfo>>,
}

impl FsPackageResolver {
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup_dir(&mut self, dir: &Path) -> Result<Option<PackageInfo>> {
        // Directories visited on the way up share the answer of the first
        // directory that has one.
        let mut visited = Vec::new();
        let mut current = Some(dir);
        let found = loop {
            let Some(dir) = current else {
                break None;
            };
            if let Some(cached) = self.cache.get(dir) {
                break cached.clone();
            }
            visited.push(dir.to_path_buf());

            let manifest = dir.join("package.json");
            if manifest.is_file() {
                break Some(read_package_info(&manifest)?);
            }
            current = dir.parent();
        };

        for dir in visited {
            self.cache.insert(dir, found.clone());
        }
        Ok(found)
    }
}

impl PackageResolver for FsPackageResolver {
    fn resolve(&mut self, module_path: &Path) -> Result<Option<PackageInfo>> {
        match module_path.parent() {
            Some(dir) => self.lookup_dir(dir),
            None => Ok(None),
        }
    }
}

fn read_package_info(path: &Path) -> Result<PackageInfo> {
    let metadata = fs::metadata(path)
        .map_err(|e| Error::io(format!("Cannot read metadata of '{}'", path.display()), e))?;
    if metadata.len() > MAX_PACKAGE_JSON_SIZE {
        return Err(Error::FileTooLarge {
            path: path.display().to_string(),
            size: metadata.len(),
            max_size: MAX_PACKAGE_JSON_SIZE,
        });
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::io(format!("Failed to read '{}'", path.display()), e))?;
    serde_json::from_str(&content).map_err(|e| {
        Error::InvalidBundle(format!("Invalid package.json '{}': {e}", path.display()))
    })
}

/// Where one module of the bundle came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleProvenance {
    pub id: ModuleId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Workspace-relative path of the module file, `/`-separated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Collect provenance for every live record of `graph`.
///
/// Only absolute path ids can be traced. A resolver failure is reported as a
/// warning and leaves that module without package information.
pub fn collect(
    graph: &BundleGraph,
    resolver: &mut dyn PackageResolver,
    workspace_root: &Path,
) -> (Vec<ModuleProvenance>, Vec<PipelineWarning>) {
    let mut modules = Vec::with_capacity(graph.len());
    let mut warnings = Vec::new();

    for record in graph.records() {
        let mut provenance = ModuleProvenance {
            id: record.id.clone(),
            package: None,
            version: None,
            repository: None,
            path: None,
        };

        if let Some(path) = record.id.as_path().filter(|path| path.is_absolute()) {
            provenance.path = relative_path(path, workspace_root);
            match resolver.resolve(path) {
                Ok(Some(info)) => {
                    provenance.package = info.name;
                    provenance.version = info.version;
                    provenance.repository = info.repository;
                }
                Ok(None) => {}
                Err(err) => warnings.push(
                    PipelineWarning::Provenance {
                        id: record.id.clone(),
                        message: err.to_string(),
                    }
                    .emit(),
                ),
            }
        }

        modules.push(provenance);
    }

    (modules, warnings)
}

/// Re-key provenance entries by the ids the bundle was written with.
pub fn rekey(modules: &mut [ModuleProvenance], mapping: &IdMapping) {
    for module in modules {
        module.id = mapping.resolve(&module.id);
    }
}

fn relative_path(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    Some(
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
    )
}
