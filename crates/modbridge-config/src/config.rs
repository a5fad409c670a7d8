//! High-level configuration structure for modbridge.
//!
//! For file discovery and layering, see the `discovery` module.

use std::path::{Path, PathBuf};

use modbridge_graph::ImportForm;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::mapping::{MappingSet, ModuleMapping};

/// Registry client every stub requires.
pub const DEFAULT_REGISTRY_CLIENT: &str = "@jenkins-cd/js-modules";

/// Namespace used in registry ids when the bundle does not set one.
pub const GLOBAL_NAMESPACE: &str = "undefined";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub bundle: BundleIdentity,

    /// Mappings for this bundle, applied in order.
    pub mappings: Vec<ModuleMapping>,

    /// Mappings shared by every bundle of the project, applied after
    /// `mappings` when `use_global_mappings` is set.
    pub global_mappings: Vec<ModuleMapping>,

    pub use_global_mappings: bool,

    /// Specifier of the runtime registry client inside the bundle.
    pub registry_client: String,

    /// How registry targets are spelled in stubs.
    pub import_form: ImportForm,

    /// Keep path ids (truncated to `workspace_root`) instead of renumbering.
    pub full_paths: bool,

    /// Root path ids are made relative to. Defaults to the directory the
    /// configuration was loaded from.
    pub workspace_root: Option<PathBuf>,

    pub output: OutputOptions,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            bundle: BundleIdentity::default(),
            mappings: Vec::new(),
            global_mappings: Vec::new(),
            use_global_mappings: true,
            registry_client: DEFAULT_REGISTRY_CLIENT.to_string(),
            import_form: ImportForm::Qualified,
            full_paths: false,
            workspace_root: None,
            output: OutputOptions::default(),
        }
    }
}

/// Name the bundle is published under in the runtime registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleIdentity {
    pub name: String,
    pub namespace: Option<String>,
    /// Host plugin that ships the bundle, recorded in the metadata file.
    pub host_plugin_id: Option<String>,
}

impl BundleIdentity {
    /// `namespace:name`, or `undefined:name` in the global namespace.
    pub fn registry_id(&self) -> String {
        format!(
            "{}:{}",
            self.namespace.as_deref().unwrap_or(GLOBAL_NAMESPACE),
            self.name
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    pub out_dir: PathBuf,
    /// Metadata side-file. Defaults to `<out_dir>/<name>.metadata.json`.
    pub metadata_file: Option<PathBuf>,
    pub pretty: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("dist"),
            metadata_file: None,
            pretty: false,
        }
    }
}

impl BridgeConfig {
    /// Create from a JSON value (a `package.json` field or programmatic config).
    ///
    /// ```
    /// use modbridge_config::BridgeConfig;
    /// use serde_json::json;
    ///
    /// let config = BridgeConfig::from_value(json!({
    ///     "bundle": { "name": "app", "namespace": "blueocean" },
    ///     "mappings": [{ "from": "react", "to": "react:react@15.3.2" }]
    /// }))
    /// .unwrap();
    /// assert_eq!(config.registry_id(), "blueocean:app");
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    pub fn registry_id(&self) -> String {
        self.bundle.registry_id()
    }

    /// Bundle mappings, then global ones if enabled. Duplicates and mappings
    /// to this bundle are dropped with a warning.
    pub fn effective_mappings(&self) -> MappingSet {
        let mut set = MappingSet::for_bundle(self.registry_id());
        set.extend(self.mappings.iter().cloned());
        if self.use_global_mappings {
            set.extend(self.global_mappings.iter().cloned());
        }
        set
    }

    /// Workspace root, falling back to `base`.
    pub fn workspace_root_or(&self, base: &Path) -> PathBuf {
        match &self.workspace_root {
            Some(root) if root.is_absolute() => root.clone(),
            Some(root) => base.join(root),
            None => base.to_path_buf(),
        }
    }

    /// Where the metadata side-file goes.
    pub fn metadata_path(&self) -> PathBuf {
        self.output.metadata_file.clone().unwrap_or_else(|| {
            self.output
                .out_dir
                .join(format!("{}.metadata.json", self.bundle.name))
        })
    }

    /// Where the rewritten bundle goes.
    pub fn bundle_path(&self) -> PathBuf {
        self.output.out_dir.join(format!("{}.json", self.bundle.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_id_without_namespace_is_global() {
        let identity = BundleIdentity {
            name: "app".into(),
            ..Default::default()
        };
        assert_eq!(identity.registry_id(), "undefined:app");
    }

    #[test]
    fn global_mappings_follow_bundle_mappings() {
        let config = BridgeConfig {
            bundle: BundleIdentity {
                name: "app".into(),
                namespace: Some("ns".into()),
                host_plugin_id: None,
            },
            mappings: vec![ModuleMapping::new("react", "react:react")],
            global_mappings: vec![
                ModuleMapping::new("react", "other:react"),
                ModuleMapping::new("jquery", "jquery-detached:jquery2"),
            ],
            ..Default::default()
        };

        let targets: Vec<_> = config
            .effective_mappings()
            .iter()
            .map(|m| m.to.clone())
            .collect();
        assert_eq!(targets, vec!["react:react", "jquery-detached:jquery2"]);

        let without_globals = BridgeConfig {
            use_global_mappings: false,
            ..config
        };
        assert_eq!(without_globals.effective_mappings().len(), 1);
    }

    #[test]
    fn metadata_path_defaults_into_out_dir() {
        let mut config = BridgeConfig::default();
        config.bundle.name = "app".into();
        assert_eq!(config.metadata_path(), PathBuf::from("dist/app.metadata.json"));
        assert_eq!(config.bundle_path(), PathBuf::from("dist/app.json"));
    }
}
