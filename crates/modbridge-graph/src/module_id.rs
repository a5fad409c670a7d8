use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier of a module record inside one bundle snapshot.
///
/// Bundlers emit either absolute filesystem paths (before renumbering, or when
/// full paths are requested) or small integers. The JSON form is preserved:
/// an id read as a number is written back as a number, and a string stays a
/// string even when it happens to contain only digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModuleId {
    /// Sequential numeric id (`12`).
    Index(u64),
    /// Path-like or otherwise opaque string id (`"/work/src/index.js"`).
    Path(String),
}

impl ModuleId {
    /// Create a string identifier.
    pub fn path(value: impl Into<String>) -> Self {
        Self::Path(value.into())
    }

    /// Returns the id as a filesystem path when it is a string id.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::Path(value) => Some(Path::new(value)),
            Self::Index(_) => None,
        }
    }

    /// Returns `true` for string ids that hold an absolute path.
    pub fn is_absolute_path(&self) -> bool {
        self.as_path().is_some_and(Path::is_absolute)
    }

    /// Borrow the identifier as a string for logging/serialization.
    pub fn path_string(&self) -> Cow<'_, str> {
        match self {
            Self::Path(value) => Cow::Borrowed(value),
            Self::Index(value) => Cow::Owned(value.to_string()),
        }
    }

    /// The id as it appears inside generated JavaScript (a JSON literal).
    pub fn js_literal(&self) -> String {
        match self {
            Self::Index(value) => value.to_string(),
            Self::Path(value) => {
                serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""))
            }
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_string())
    }
}

impl From<u64> for ModuleId {
    fn from(value: u64) -> Self {
        Self::Index(value)
    }
}

impl From<&str> for ModuleId {
    fn from(value: &str) -> Self {
        Self::Path(value.to_string())
    }
}

impl From<String> for ModuleId {
    fn from(value: String) -> Self {
        Self::Path(value)
    }
}

impl Serialize for ModuleId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Index(value) => serializer.serialize_u64(*value),
            Self::Path(value) => serializer.serialize_str(value),
        }
    }
}

impl<'de> Deserialize<'de> for ModuleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ModuleIdVisitor)
    }
}

struct ModuleIdVisitor;

impl Visitor<'_> for ModuleIdVisitor {
    type Value = ModuleId;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a module id (string or non-negative integer)")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(ModuleId::Index(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        u64::try_from(value)
            .map(ModuleId::Index)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(ModuleId::Path(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(ModuleId::Path(value))
    }
}
