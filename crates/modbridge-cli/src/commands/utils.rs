//! Shared utilities for command implementations.

use std::path::{Path, PathBuf};

use modbridge_config::{BridgeConfig, ConfigDiscovery, validate_schema};
use serde::Serialize;

use crate::error::{CliError, Result};

/// Resolve a path relative to a working directory.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// `--cwd` if given, else the process working directory.
pub fn get_cwd(cwd: Option<&Path>) -> Result<PathBuf> {
    match cwd {
        Some(dir) if dir.is_dir() => Ok(dir.to_path_buf()),
        Some(dir) => Err(CliError::InvalidArgument(format!(
            "--cwd is not a directory: {}",
            dir.display()
        ))),
        None => Ok(std::env::current_dir()?),
    }
}

/// Command-line values layered over file and environment configuration.
/// Unset values leave the lower layers alone.
#[derive(Debug, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "BundleOverrides::is_empty")]
    pub bundle: BundleOverrides,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_paths: Option<bool>,
    #[serde(skip_serializing_if = "OutputOverrides::is_empty")]
    pub output: OutputOverrides,
}

#[derive(Debug, Default, Serialize)]
pub struct BundleOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl BundleOverrides {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.namespace.is_none()
    }
}

#[derive(Debug, Default, Serialize)]
pub struct OutputOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,
}

impl OutputOverrides {
    fn is_empty(&self) -> bool {
        self.out_dir.is_none() && self.metadata_file.is_none() && self.pretty.is_none()
    }
}

/// Load every configuration layer and validate the result.
///
/// An explicit `--config` must exist; without one, a project with no
/// configuration file runs on defaults plus overrides.
pub fn load_config(
    cwd: &Path,
    config_file: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<BridgeConfig> {
    let mut discovery = ConfigDiscovery::new(cwd);
    if let Some(file) = config_file {
        discovery = discovery.with_file(file);
    }
    match discovery.find() {
        Some(path) => tracing::debug!(path = %path.display(), "using configuration file"),
        None => tracing::debug!("no configuration file, using defaults"),
    }

    let config = discovery.load_with(overrides)?;
    validate_schema(&config)?;
    Ok(config)
}
