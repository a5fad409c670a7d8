use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ModuleId;

/// One entry of the flat bundle emitted by the bundler.
///
/// Fields the pipeline does not understand are kept in `extra` and written
/// back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub id: ModuleId,
    #[serde(default)]
    pub source: String,
    /// Declared specifier (as written in source) -> target id.
    #[serde(default)]
    pub deps: IndexMap<String, ModuleId>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub entry: bool,
    /// Explicit "implementation shared with" edge, for producers that emit one
    /// instead of (or in addition to) the source marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedupe: Option<ModuleId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ModuleRecord {
    /// Create a record with no dependencies.
    pub fn new(id: impl Into<ModuleId>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            deps: IndexMap::new(),
            entry: false,
            dedupe: None,
            extra: Map::new(),
        }
    }

    /// Add a declared dependency edge.
    pub fn dep(mut self, specifier: impl Into<String>, target: impl Into<ModuleId>) -> Self {
        self.deps.insert(specifier.into(), target.into());
        self
    }

    /// Mark the record as the bundle entry point.
    pub fn entry(mut self) -> Self {
        self.entry = true;
        self
    }

    /// Set the explicit dedupe edge.
    pub fn dedupe_of(mut self, target: impl Into<ModuleId>) -> Self {
        self.dedupe = Some(target.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_fields_round_trip() {
        let json = r#"{"id":1,"source":"x","deps":{"a":2},"entry":true,"order":0}"#;
        let record: ModuleRecord = serde_json::from_str(json).unwrap();
        assert!(record.entry);
        assert_eq!(record.extra.get("order"), Some(&Value::from(0)));
        assert_eq!(serde_json::to_string(&record).unwrap(), json);
    }

    #[test]
    fn entry_false_is_omitted() {
        let record = ModuleRecord::new(2u64, "");
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"id":2,"source":"","deps":{}}"#
        );
    }
}
