//! Recoverable problems found while transforming a bundle.
//!
//! None of these stop a run. Each is logged with `tracing::warn!` when it is
//! found and returned in the run report, so callers can render them (they are
//! `miette` diagnostics with warning severity) or fail on them.

use miette::Diagnostic;
use modbridge_config::IgnoredMapping;
use modbridge_graph::{DanglingAlias, DanglingEdge, ExtractionAnomaly, ModuleId, SpecifierError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error, Diagnostic, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineWarning {
    /// The mapping's registry target does not parse.
    #[error("mapping of '{from}' has a malformed target '{to}': {error}")]
    #[diagnostic(
        code(modbridge::malformed_target),
        severity(Warning),
        help("registry targets look like 'namespace:module[@version][/sub/path]'")
    )]
    MalformedTarget {
        from: String,
        to: String,
        #[serde(serialize_with = "serialize_display")]
        error: SpecifierError,
    },

    /// More than one module in the bundle is known by the mapped name.
    #[error("'{name}' resolves to {} different modules ({}); left unmapped", .candidates.len(), join(.candidates))]
    #[diagnostic(
        code(modbridge::ambiguous),
        severity(Warning),
        help("map each copy explicitly through the mapping's 'aliases'")
    )]
    Ambiguous {
        name: String,
        candidates: Vec<ModuleId>,
    },

    /// The registry client is not in the bundle although mapped modules are.
    #[error("'{client}' is not part of the bundle, so no module could be stubbed")]
    #[diagnostic(
        code(modbridge::missing_client),
        severity(Warning),
        help("add the registry client as a dependency of the bundle's entry module")
    )]
    MissingClient { client: String },

    /// The mapped name resolves to an id without a record.
    #[error("'{name}' resolves to '{id}', which has no record in the bundle")]
    #[diagnostic(code(modbridge::missing_record), severity(Warning))]
    MissingRecord { name: String, id: ModuleId },

    /// An alias path of a mapping is not a module id of the bundle.
    #[error("alias '{alias}' of mapping '{from}' is not a module of the bundle")]
    #[diagnostic(code(modbridge::alias_not_found), severity(Warning))]
    AliasNotFound { from: String, alias: String },

    #[error("{0}")]
    #[diagnostic(code(modbridge::ignored_mapping), severity(Warning))]
    IgnoredMapping(IgnoredMapping),

    #[error("{0}")]
    #[diagnostic(code(modbridge::anomaly), severity(Warning))]
    Anomaly(ExtractionAnomaly),

    #[error("{0}")]
    #[diagnostic(
        code(modbridge::dangling_edge),
        severity(Warning),
        help("a module still requires something the pruner considered unreachable")
    )]
    DanglingEdge(DanglingEdge),

    #[error("{0}")]
    #[diagnostic(code(modbridge::dangling_alias), severity(Warning))]
    DanglingAlias(DanglingAlias),

    /// Package information for a module could not be read.
    #[error("no package information for '{id}': {message}")]
    #[diagnostic(code(modbridge::provenance), severity(Warning))]
    Provenance { id: ModuleId, message: String },
}

impl PipelineWarning {
    /// Log the warning and hand it back, for `warnings.push(w.emit())`.
    pub fn emit(self) -> Self {
        tracing::warn!("{self}");
        self
    }
}

fn join(ids: &[ModuleId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn serialize_display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: std::fmt::Display,
    S: serde::Serializer,
{
    serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_message_lists_candidates() {
        let warning = PipelineWarning::Ambiguous {
            name: "./util".into(),
            candidates: vec![ModuleId::Index(4), ModuleId::Index(5)],
        };
        assert_eq!(
            warning.to_string(),
            "'./util' resolves to 2 different modules (4, 5); left unmapped"
        );
        assert_eq!(warning.severity(), Some(miette::Severity::Warning));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let warning = PipelineWarning::MissingClient {
            client: "@jenkins-cd/js-modules".into(),
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["kind"], "missing_client");
    }
}
