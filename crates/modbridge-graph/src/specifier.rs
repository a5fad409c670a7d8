//! Module identity resolution.
//!
//! Parses the specifiers used on both sides of a module mapping:
//!
//! - [`ModuleSpec`]: what the bundle calls a module (`lodash`, `@scope/pkg/sub`,
//!   `jquery@2.1.4`).
//! - [`RegistryTarget`]: where the runtime registry serves it from
//!   (`jquery-detached:jquery2`).
//!
//! Everything here is pure: no graph, no filesystem.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while parsing a specifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecifierError {
    #[error("specifier is empty")]
    Empty,

    #[error("specifier '{specifier}' contains an invalid character {character:?}")]
    InvalidCharacter { specifier: String, character: char },

    #[error("specifier '{0}' has an invalid package scope (expected '@scope/name')")]
    InvalidScope(String),

    #[error("specifier '{0}' contains an empty path segment")]
    EmptySegment(String),

    #[error("specifier '{specifier}' has an invalid version qualifier '{version}'")]
    InvalidVersion { specifier: String, version: String },

    #[error("registry target '{0}' has an invalid namespace")]
    InvalidNamespace(String),

    #[error("registry target '{0}' must name a package, not a relative path")]
    RelativeTarget(String),
}

/// Parsed module specifier.
///
/// Relative and absolute specifiers (`./util`, `/abs/file.js`) are kept whole in
/// `module_name`; they never carry a sub-path or version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleSpec {
    pub module_name: String,
    pub sub_path: Option<String>,
    pub version: Option<String>,
}

impl ModuleSpec {
    /// Parse a specifier.
    ///
    /// ```
    /// use modbridge_graph::ModuleSpec;
    ///
    /// let spec = ModuleSpec::parse("@scope/pkg@^2.0.0/lib/util").unwrap();
    /// assert_eq!(spec.module_name, "@scope/pkg");
    /// assert_eq!(spec.sub_path.as_deref(), Some("lib/util"));
    /// assert_eq!(spec.version.as_deref(), Some("^2.0.0"));
    /// assert_eq!(spec.request(), "@scope/pkg/lib/util");
    /// ```
    pub fn parse(specifier: &str) -> Result<Self, SpecifierError> {
        if specifier.is_empty() {
            return Err(SpecifierError::Empty);
        }
        check_characters(specifier)?;

        if is_relative(specifier) {
            return Ok(Self {
                module_name: specifier.to_string(),
                sub_path: None,
                version: None,
            });
        }

        // Split off the package portion: one segment, or two for scoped packages.
        let (scope, rest) = if let Some(scoped) = specifier.strip_prefix('@') {
            let (scope, rest) = scoped
                .split_once('/')
                .ok_or_else(|| SpecifierError::InvalidScope(specifier.to_string()))?;
            if scope.is_empty() || rest.is_empty() || rest.starts_with('@') {
                return Err(SpecifierError::InvalidScope(specifier.to_string()));
            }
            (Some(scope), rest)
        } else {
            (None, specifier)
        };

        let (name_segment, sub_path) = match rest.split_once('/') {
            Some((name, sub)) => (name, Some(sub)),
            None => (rest, None),
        };

        let (name, version) = match name_segment.split_once('@') {
            Some((name, version)) => (name, Some(version)),
            None => (name_segment, None),
        };

        if name.is_empty() {
            return Err(SpecifierError::EmptySegment(specifier.to_string()));
        }

        if let Some(version) = version {
            if !is_version_qualifier(version) {
                return Err(SpecifierError::InvalidVersion {
                    specifier: specifier.to_string(),
                    version: version.to_string(),
                });
            }
        }

        if let Some(sub) = sub_path {
            if sub.split('/').any(str::is_empty) {
                return Err(SpecifierError::EmptySegment(specifier.to_string()));
            }
        }

        let module_name = match scope {
            Some(scope) => format!("@{scope}/{name}"),
            None => name.to_string(),
        };

        Ok(Self {
            module_name,
            sub_path: sub_path.map(str::to_string),
            version: version.map(str::to_string),
        })
    }

    /// The specifier as it would be written in a `require` call, without the
    /// version qualifier. This is the name modules are known by in a bundle.
    pub fn request(&self) -> String {
        match &self.sub_path {
            Some(sub) => format!("{}/{}", self.module_name, sub),
            None => self.module_name.clone(),
        }
    }

    /// Returns `true` for `./x`, `../x` and absolute specifiers.
    pub fn is_relative(&self) -> bool {
        is_relative(&self.module_name)
    }
}

impl fmt::Display for ModuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.module_name)?;
        if let Some(version) = &self.version {
            write!(f, "@{version}")?;
        }
        if let Some(sub) = &self.sub_path {
            write!(f, "/{sub}")?;
        }
        Ok(())
    }
}

/// How a registry target is spelled inside a stub's lookup call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportForm {
    /// `namespace:module[/sub]`, version qualifiers dropped.
    #[default]
    Qualified,
    /// Like `Qualified`, keeping `@version` when the target carries one.
    Pinned,
}

/// A module in the runtime registry namespace (`namespace:module`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistryTarget {
    pub namespace: Option<String>,
    pub module: ModuleSpec,
}

impl RegistryTarget {
    /// Parse a registry target such as `jquery-detached:jquery2`.
    ///
    /// The namespace is optional; a target without one resolves in the
    /// registry's global namespace.
    pub fn parse(target: &str) -> Result<Self, SpecifierError> {
        if target.is_empty() {
            return Err(SpecifierError::Empty);
        }

        let (namespace, module) = match target.split_once(':') {
            Some((namespace, module)) => {
                if !is_namespace(namespace) {
                    return Err(SpecifierError::InvalidNamespace(target.to_string()));
                }
                (Some(namespace.to_string()), module)
            }
            None => (None, target),
        };

        let module = ModuleSpec::parse(module)?;
        if module.is_relative() {
            return Err(SpecifierError::RelativeTarget(target.to_string()));
        }

        Ok(Self { namespace, module })
    }

    /// The version this target pins, when it names an exact one rather than
    /// a range.
    pub fn exact_version(&self) -> Option<Version> {
        self.module.version.as_deref().and_then(Version::parse)
    }

    /// Build the string a stub embeds in its registry lookup.
    ///
    /// ```
    /// use modbridge_graph::{ImportForm, RegistryTarget};
    ///
    /// let target = RegistryTarget::parse("jquery-detached:jquery2@2.1.4").unwrap();
    /// assert_eq!(target.import_form(ImportForm::Qualified), "jquery-detached:jquery2");
    /// assert_eq!(target.import_form(ImportForm::Pinned), "jquery-detached:jquery2@2.1.4");
    /// ```
    pub fn import_form(&self, form: ImportForm) -> String {
        let mut out = String::new();
        if let Some(namespace) = &self.namespace {
            out.push_str(namespace);
            out.push(':');
        }
        out.push_str(&self.module.module_name);
        if form == ImportForm::Pinned {
            if let Some(version) = &self.module.version {
                out.push('@');
                out.push_str(version);
            }
        }
        if let Some(sub) = &self.module.sub_path {
            out.push('/');
            out.push_str(sub);
        }
        out
    }
}

impl fmt::Display for RegistryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.import_form(ImportForm::Pinned))
    }
}

/// Exact `major.minor.patch[-prerelease]` version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<String>,
}

impl Version {
    /// Parse an exact version. Ranges (`^1.2`, `~2`) are not exact and yield
    /// `None`.
    pub fn parse(value: &str) -> Option<Self> {
        static VERSION: LazyLock<Option<Regex>> = LazyLock::new(|| {
            Regex::new(r"^v?(\d+)\.(\d+)\.(\d+)(?:-([0-9A-Za-z.\-]+))?(?:\+[0-9A-Za-z.\-]+)?$")
                .ok()
        });

        let caps = VERSION.as_ref()?.captures(value)?;
        Some(Self {
            major: caps.get(1)?.as_str().parse().ok()?,
            minor: caps.get(2)?.as_str().parse().ok()?,
            patch: caps.get(3)?.as_str().parse().ok()?,
            prerelease: caps.get(4).map(|m| m.as_str().to_string()),
        })
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier == "."
        || specifier == ".."
        || specifier.starts_with('/')
}

fn check_characters(specifier: &str) -> Result<(), SpecifierError> {
    match specifier
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || matches!(c, '\'' | '"' | '\\' | '`'))
    {
        Some(character) => Err(SpecifierError::InvalidCharacter {
            specifier: specifier.to_string(),
            character,
        }),
        None => Ok(()),
    }
}

fn is_version_qualifier(version: &str) -> bool {
    !version.is_empty()
        && version.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || matches!(c, '.' | '-' | '+' | '^' | '~' | '*' | '<' | '>' | '=' | '|')
        })
}

fn is_namespace(namespace: &str) -> bool {
    !namespace.is_empty()
        && namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_scoped_packages() {
        let spec = ModuleSpec::parse("lodash").unwrap();
        assert_eq!(spec.module_name, "lodash");
        assert_eq!(spec.sub_path, None);
        assert_eq!(spec.version, None);

        let spec = ModuleSpec::parse("lodash/fp/map").unwrap();
        assert_eq!(spec.module_name, "lodash");
        assert_eq!(spec.sub_path.as_deref(), Some("fp/map"));

        let spec = ModuleSpec::parse("@jenkins-cd/js-modules").unwrap();
        assert_eq!(spec.module_name, "@jenkins-cd/js-modules");
        assert_eq!(spec.request(), "@jenkins-cd/js-modules");
    }

    #[test]
    fn parses_version_qualifiers() {
        let spec = ModuleSpec::parse("jquery@2.1.4").unwrap();
        assert_eq!(spec.module_name, "jquery");
        assert_eq!(spec.version.as_deref(), Some("2.1.4"));
        assert_eq!(spec.request(), "jquery");
        assert_eq!(spec.to_string(), "jquery@2.1.4");
    }

    #[test]
    fn relative_specifiers_stay_whole() {
        let spec = ModuleSpec::parse("./lib/a@b.js").unwrap();
        assert_eq!(spec.module_name, "./lib/a@b.js");
        assert!(spec.is_relative());
        assert_eq!(spec.version, None);
    }

    #[test]
    fn rejects_malformed_specifiers() {
        assert_eq!(ModuleSpec::parse(""), Err(SpecifierError::Empty));
        assert!(matches!(
            ModuleSpec::parse("@scope"),
            Err(SpecifierError::InvalidScope(_))
        ));
        assert!(matches!(
            ModuleSpec::parse("@/pkg"),
            Err(SpecifierError::InvalidScope(_))
        ));
        assert!(matches!(
            ModuleSpec::parse("pkg//sub"),
            Err(SpecifierError::EmptySegment(_))
        ));
        assert!(matches!(
            ModuleSpec::parse("@1.0.0"),
            Err(SpecifierError::InvalidScope(_))
        ));
        assert!(matches!(
            ModuleSpec::parse("pkg@"),
            Err(SpecifierError::InvalidVersion { .. })
        ));
        assert!(matches!(
            ModuleSpec::parse("pkg name"),
            Err(SpecifierError::InvalidCharacter { character: ' ', .. })
        ));
        assert!(matches!(
            ModuleSpec::parse("pkg'"),
            Err(SpecifierError::InvalidCharacter { .. })
        ));
    }

    #[test]
    fn registry_targets() {
        let target = RegistryTarget::parse("ns:pkg2").unwrap();
        assert_eq!(target.namespace.as_deref(), Some("ns"));
        assert_eq!(target.import_form(ImportForm::Qualified), "ns:pkg2");

        let target = RegistryTarget::parse("handlebars").unwrap();
        assert_eq!(target.namespace, None);
        assert_eq!(target.import_form(ImportForm::Pinned), "handlebars");

        assert!(matches!(
            RegistryTarget::parse(":pkg"),
            Err(SpecifierError::InvalidNamespace(_))
        ));
        assert!(matches!(
            RegistryTarget::parse("ns:./local"),
            Err(SpecifierError::RelativeTarget(_))
        ));
        assert!(RegistryTarget::parse("ns:").is_err());
    }

    #[test]
    fn pinned_form_keeps_sub_path_after_version() {
        let target = RegistryTarget::parse("ns:pkg@1.0.0/sub").unwrap();
        assert_eq!(target.import_form(ImportForm::Pinned), "ns:pkg@1.0.0/sub");
        assert_eq!(target.import_form(ImportForm::Qualified), "ns:pkg/sub");
    }

    #[test]
    fn version_parse() {
        let version = Version::parse("1.2.3").unwrap();
        assert_eq!((version.major, version.minor, version.patch), (1, 2, 3));
        assert_eq!(version.prerelease, None);

        let version = Version::parse("1.2.3-beta.1").unwrap();
        assert_eq!(version.prerelease.as_deref(), Some("beta.1"));

        assert_eq!(Version::parse("^1.2.3"), None);
        assert_eq!(Version::parse("1.2"), None);
    }

    #[test]
    fn exact_version_ignores_ranges() {
        let target = RegistryTarget::parse("react:react@15.3.2").unwrap();
        assert_eq!(target.exact_version().map(|v| v.major), Some(15));
        assert_eq!(RegistryTarget::parse("react:react@^15.3").unwrap().exact_version(), None);
        assert_eq!(RegistryTarget::parse("react:react").unwrap().exact_version(), None);
    }
}
