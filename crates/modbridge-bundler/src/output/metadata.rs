//! The metadata side-file.
//!
//! Hosts read it to learn under which registry id the bundle publishes
//! itself and which npm packages went into it.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::io::write_file;
use crate::provenance::ModuleProvenance;
use crate::{Error, Result};

/// Version written to `builderVersion`.
pub const BUILDER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleMetadata {
    /// `namespace:name` the bundle exports itself under.
    pub registry_id: String,
    /// Creation time, serialized as RFC 3339.
    pub created: DateTime<Utc>,
    pub builder_version: String,
    pub pack_metadata: PackMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_plugin_id: Option<String>,
}

/// Per-module provenance of the written bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PackMetadata {
    pub modules: Vec<ModuleProvenance>,
}

impl BundleMetadata {
    pub fn new(registry_id: impl Into<String>, modules: Vec<ModuleProvenance>) -> Self {
        Self {
            registry_id: registry_id.into(),
            created: Utc::now(),
            builder_version: BUILDER_VERSION.to_string(),
            pack_metadata: PackMetadata { modules },
            host_plugin_id: None,
        }
    }

    pub fn with_host_plugin_id(mut self, id: Option<String>) -> Self {
        self.host_plugin_id = id;
        self
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.map_err(|e| Error::WriteFailure(format!("Failed to serialize metadata: {e}")))
    }
}

/// Write `metadata` to `path`, pretty printed.
pub fn write_metadata(path: &Path, metadata: &BundleMetadata) -> Result<()> {
    let json = metadata.to_json(true)?;
    write_file(path, json.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModuleId;
    use chrono::TimeZone;

    #[test]
    fn serializes_camel_case_document() {
        let mut metadata = BundleMetadata::new(
            "blueocean:app",
            vec![ModuleProvenance {
                id: ModuleId::Index(1),
                package: Some("app".into()),
                version: Some("1.0.0".into()),
                repository: None,
                path: Some("src/index.js".into()),
            }],
        );
        metadata.created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let json: serde_json::Value = serde_json::from_str(&metadata.to_json(false).unwrap()).unwrap();
        assert_eq!(json["registryId"], "blueocean:app");
        assert_eq!(json["created"], "2024-05-01T12:00:00Z");
        assert_eq!(json["builderVersion"], BUILDER_VERSION);
        assert_eq!(json["packMetadata"]["modules"][0]["path"], "src/index.js");
        assert!(json.get("hostPluginId").is_none());
    }
}
