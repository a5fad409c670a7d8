//! File-based config discovery and layering.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. `modbridge.toml`, or the `"modbridge"` field of `package.json`
//! 3. `MODBRIDGE_*` environment variables (`__` separates nested keys, so
//!    `MODBRIDGE_BUNDLE__NAME=app` sets `bundle.name`)
//! 4. caller overrides (CLI flags)

use std::fs;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format as _, Json, Serialized, Toml};
use serde::Serialize;
use serde_json::Value;

use crate::config::BridgeConfig;
use crate::error::{ConfigError, Result};

pub const CONFIG_FILE: &str = "modbridge.toml";
pub const PACKAGE_JSON_FIELD: &str = "modbridge";
pub const ENV_PREFIX: &str = "MODBRIDGE_";

/// Searches for modbridge configuration in a project directory.
///
/// # Example
///
/// ```no_run
/// use modbridge_config::ConfigDiscovery;
///
/// let config = ConfigDiscovery::new(".").load().unwrap();
/// println!("{}", config.registry_id());
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
    explicit: Option<PathBuf>,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            explicit: None,
        }
    }

    /// Use `path` instead of searching. Relative paths resolve against the root.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.explicit = Some(self.root.join(path));
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find a config file in the root directory
    ///
    /// Searches in this order:
    /// 1. TOML config: modbridge.toml
    /// 2. package.json (modbridge field)
    pub fn find(&self) -> Option<PathBuf> {
        if let Some(path) = &self.explicit {
            return Some(path.clone());
        }

        let toml_path = self.root.join(CONFIG_FILE);
        if toml_path.exists() {
            return Some(toml_path);
        }

        let pkg_path = self.root.join("package.json");
        let has_field = fs::read_to_string(&pkg_path)
            .ok()
            .and_then(|content| serde_json::from_str::<Value>(&content).ok())
            .is_some_and(|parsed| {
                parsed
                    .get(PACKAGE_JSON_FIELD)
                    .is_some_and(|field| !field.is_null())
            });
        has_field.then_some(pkg_path)
    }

    /// Defaults, then the discovered file (if any), then the environment.
    pub fn figment(&self) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(BridgeConfig::default()));

        if let Some(path) = self.find() {
            figment = figment.merge(file_provider(&path)?);
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load config from discovered file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no config file is found.
    pub fn load(&self) -> Result<BridgeConfig> {
        if self.find().is_none() {
            return Err(ConfigError::NotFound);
        }
        extract(self.figment()?)
    }

    /// Load with every layer, tolerating a missing config file, and merge
    /// `overrides` last.
    pub fn load_with<T: Serialize>(&self, overrides: T) -> Result<BridgeConfig> {
        extract(self.figment()?.merge(Serialized::defaults(overrides)))
    }
}

fn file_provider(path: &Path) -> Result<Figment> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let is_package_json = path.file_name() == Some(std::ffi::OsStr::new("package.json"));
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Ok(Figment::from(Toml::file(path))),
        Some("json") if is_package_json => {
            Ok(Figment::from(Json::file(path)).focus(PACKAGE_JSON_FIELD))
        }
        Some("json") => Ok(Figment::from(Json::file(path))),
        _ => Err(ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

fn extract(figment: Figment) -> Result<BridgeConfig> {
    figment.extract().map_err(|e: figment::Error| {
        let field = if e.path.is_empty() {
            "configuration".to_string()
        } else {
            e.path.join(".")
        };
        ConfigError::InvalidValue {
            field,
            hint: Some(e.to_string()),
        }
    })
}

/// Discover and load config from the current directory.
pub fn discover() -> Result<BridgeConfig> {
    let root = std::env::current_dir()?;
    ConfigDiscovery::new(&root).load()
}
