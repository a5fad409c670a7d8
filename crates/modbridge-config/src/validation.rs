//! Pluggable config validation strategies.

use modbridge_graph::{ModuleSpec, RegistryTarget};

use crate::config::BridgeConfig;
use crate::error::{ConfigError, Result};
use crate::mapping::ModuleMapping;

/// Trait for pluggable config validation strategies
pub trait ConfigValidator {
    fn validate(&self, config: &BridgeConfig) -> Result<()>;
}

/// Schema-only validation (no filesystem checks).
///
/// Covers what a run cannot proceed without. Individual mappings are left to
/// [`MappingValidator`]; a transform reports a bad mapping and skips it.
///
/// # Example
///
/// ```
/// use modbridge_config::{BridgeConfig, ConfigValidator, ModuleMapping, SchemaValidator};
///
/// let mut config = BridgeConfig::default();
/// config.bundle.name = "app".into();
/// config.mappings.push(ModuleMapping::new("jquery", "jquery-detached:jquery2"));
///
/// SchemaValidator.validate(&config).unwrap();
/// ```
pub struct SchemaValidator;

impl ConfigValidator for SchemaValidator {
    fn validate(&self, config: &BridgeConfig) -> Result<()> {
        if config.bundle.name.trim().is_empty() {
            return Err(ConfigError::MissingBundleName);
        }

        if let Some(namespace) = &config.bundle.namespace {
            if namespace.is_empty() || namespace.contains(':') {
                return Err(ConfigError::SchemaValidation {
                    message: format!("bundle namespace '{namespace}' is not valid"),
                    hint: Some("Use a plain name such as the host plugin id".to_string()),
                });
            }
        }

        ModuleSpec::parse(&config.registry_client).map_err(|e| ConfigError::SchemaValidation {
            message: format!("registry_client: {e}"),
            hint: Some("Set registry_client to the package name of the registry client".to_string()),
        })?;

        Ok(())
    }
}

/// Strict per-mapping validation, for `check`.
pub struct MappingValidator;

impl ConfigValidator for MappingValidator {
    fn validate(&self, config: &BridgeConfig) -> Result<()> {
        config
            .mappings
            .iter()
            .chain(&config.global_mappings)
            .try_for_each(validate_mapping)
    }
}

fn validate_mapping(mapping: &ModuleMapping) -> Result<()> {
    let invalid = |message: String| ConfigError::InvalidMapping {
        from: mapping.from.clone(),
        to: mapping.to.clone(),
        message,
    };

    ModuleSpec::parse(&mapping.from).map_err(|e| invalid(e.to_string()))?;
    RegistryTarget::parse(&mapping.to).map_err(|e| invalid(e.to_string()))?;
    if let Some(require) = &mapping.config.require {
        ModuleSpec::parse(require).map_err(|e| invalid(format!("require: {e}")))?;
    }
    if mapping.config.aliases.iter().any(|alias| alias.trim().is_empty()) {
        return Err(invalid("aliases cannot contain empty paths".to_string()));
    }

    Ok(())
}

/// Validate config schema (convenience function).
pub fn validate_schema(config: &BridgeConfig) -> Result<()> {
    SchemaValidator.validate(config)
}

/// Validate every bundle and global mapping.
pub fn validate_mappings(config: &BridgeConfig) -> Result<()> {
    MappingValidator.validate(config)
}
