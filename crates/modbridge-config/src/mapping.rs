//! Module mappings: which bundled modules are served by the runtime registry.

use serde::{Deserialize, Serialize};

/// Maps a module the bundle requires to a module the runtime registry serves.
///
/// ```toml
/// [[mappings]]
/// from = "jquery"
/// to = "jquery-detached:jquery2"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMapping {
    /// Specifier the bundle uses for the module (`jquery`, `@scope/pkg`).
    pub from: String,
    /// Registry target (`namespace:module[@version][/sub]`).
    pub to: String,
    #[serde(default)]
    pub config: MappingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Module ids (physical paths) stubbed the same way, for copies of the
    /// package that are not reachable through `from`.
    pub aliases: Vec<String>,
    /// Have the stub ask the registry to add the target's default CSS.
    #[serde(alias = "addDefaultCSS")]
    pub add_default_css: bool,
    /// Specifier the bundle declares instead of `from`, when an earlier
    /// transform rewrote the require.
    pub require: Option<String>,
}

/// Require override applied when handlebars is served as `handlebars:handlebars3`.
const HANDLEBARS_RUNTIME: &str = "jenkins-handlebars-rt/runtimes/handlebars3_rt";

impl ModuleMapping {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            config: MappingConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MappingConfig) -> Self {
        self.config = config;
        self
    }

    /// Name used to find the module in the bundle.
    pub fn lookup_name(&self) -> &str {
        self.config.require.as_deref().unwrap_or(&self.from)
    }

    /// Fill in defaults that depend on the mapping itself.
    pub fn normalized(mut self) -> Self {
        if self.from == "handlebars"
            && self.to == "handlebars:handlebars3"
            && self.config.require.is_none()
        {
            self.config.require = Some(HANDLEBARS_RUNTIME.to_string());
        }
        self
    }
}

/// Why a mapping was left out of a [`MappingSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// An earlier mapping already covers the same `from`.
    Duplicate,
    /// The mapping points at the bundle being built.
    SelfMapping,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IgnoredMapping {
    pub mapping: ModuleMapping,
    pub reason: IgnoreReason,
}

impl std::fmt::Display for IgnoredMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ModuleMapping { from, to, .. } = &self.mapping;
        match self.reason {
            IgnoreReason::Duplicate => write!(
                f,
                "ignoring mapping of '{from}' to '{to}': the bundle already has a mapping for '{from}'"
            ),
            IgnoreReason::SelfMapping => write!(
                f,
                "ignoring mapping of '{from}' to '{to}': a bundle cannot import itself"
            ),
        }
    }
}

/// Ordered mappings for one bundle, first mapping per `from` wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MappingSet {
    mappings: Vec<ModuleMapping>,
    ignored: Vec<IgnoredMapping>,
    #[serde(skip)]
    registry_id: Option<String>,
}

impl MappingSet {
    /// Empty set for the bundle published as `registry_id`.
    pub fn for_bundle(registry_id: impl Into<String>) -> Self {
        Self {
            registry_id: Some(registry_id.into()),
            ..Self::default()
        }
    }

    /// Add a mapping, or record why it was ignored. Returns whether it was
    /// added.
    pub fn push(&mut self, mapping: ModuleMapping) -> bool {
        let mapping = mapping.normalized();

        let reason = if self.registry_id.as_deref() == Some(mapping.to.as_str()) {
            Some(IgnoreReason::SelfMapping)
        } else if self.mappings.iter().any(|m| m.from == mapping.from) {
            Some(IgnoreReason::Duplicate)
        } else {
            None
        };

        match reason {
            Some(reason) => {
                let ignored = IgnoredMapping { mapping, reason };
                tracing::warn!("{ignored}");
                self.ignored.push(ignored);
                false
            }
            None => {
                self.mappings.push(mapping);
                true
            }
        }
    }

    pub fn extend(&mut self, mappings: impl IntoIterator<Item = ModuleMapping>) {
        for mapping in mappings {
            self.push(mapping);
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ModuleMapping> {
        self.mappings.iter()
    }

    pub fn ignored(&self) -> &[IgnoredMapping] {
        &self.ignored
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn find(&self, from: &str) -> Option<&ModuleMapping> {
        self.mappings.iter().find(|m| m.from == from)
    }
}

impl<'a> IntoIterator for &'a MappingSet {
    type Item = &'a ModuleMapping;
    type IntoIter = std::slice::Iter<'a, ModuleMapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<ModuleMapping> for MappingSet {
    fn from_iter<I: IntoIterator<Item = ModuleMapping>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}
