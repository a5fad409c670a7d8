//! Bundler dedupe markers.
//!
//! When the bundler finds two byte-identical modules it keeps one and turns the
//! other into a forwarder whose whole body is
//! `arguments[4][<id>][0].apply(exports,arguments)`, where `<id>` is the JSON
//! literal of the kept module's id. The kept module may then have no ordinary
//! dependants at all and still be required at runtime.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::ModuleId;

const MARKER_PATTERN: &str =
    r#"arguments\[4\]\[("(?:[^"\\]|\\.)*"|\d+)\]\[0\]\.apply\(exports,\s*arguments\)"#;

fn marker_regex() -> Option<&'static Regex> {
    static MARKER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(MARKER_PATTERN).ok());
    MARKER.as_ref()
}

/// The forwarder body the bundler emits for a deduplicated module.
pub fn dedupe_marker(target: &ModuleId) -> String {
    format!(
        "arguments[4][{}][0].apply(exports,arguments)",
        target.js_literal()
    )
}

/// Find the id a dedupe marker in `source` points at.
pub fn find_dedupe_target(source: &str) -> Option<ModuleId> {
    // Cheap pre-check; most modules are not forwarders.
    if !source.contains("arguments[4][") {
        return None;
    }
    let caps = marker_regex()?.captures(source)?;
    parse_literal(caps.get(1)?.as_str())
}

/// Every id the dedupe markers in `source` point at, in order of appearance.
pub fn find_dedupe_targets(source: &str) -> Vec<ModuleId> {
    if !source.contains("arguments[4][") {
        return Vec::new();
    }
    let Some(regex) = marker_regex() else {
        return Vec::new();
    };
    regex
        .captures_iter(source)
        .filter_map(|caps| parse_literal(caps.get(1)?.as_str()))
        .collect()
}

/// Rewrite the id inside every dedupe marker in `source`.
///
/// `remap` returns the replacement id, or `None` to leave an occurrence as it
/// is. Formatting around the literal is preserved.
pub fn rewrite_dedupe_targets<'a, F>(source: &'a str, mut remap: F) -> Cow<'a, str>
where
    F: FnMut(&ModuleId) -> Option<ModuleId>,
{
    if !source.contains("arguments[4][") {
        return Cow::Borrowed(source);
    }
    let Some(regex) = marker_regex() else {
        return Cow::Borrowed(source);
    };

    regex.replace_all(source, |caps: &Captures<'_>| {
        let whole = &caps[0];
        let (Some(full), Some(literal)) = (caps.get(0), caps.get(1)) else {
            return whole.to_string();
        };
        let replacement = parse_literal(literal.as_str())
            .and_then(|old| remap(&old))
            .map(|new| new.js_literal());

        match replacement {
            Some(new_literal) => {
                let start = literal.start() - full.start();
                let end = literal.end() - full.start();
                format!("{}{}{}", &whole[..start], new_literal, &whole[end..])
            }
            None => whole.to_string(),
        }
    })
}

fn parse_literal(literal: &str) -> Option<ModuleId> {
    if literal.starts_with('"') {
        serde_json::from_str::<String>(literal).ok().map(ModuleId::Path)
    } else {
        literal.parse().ok().map(ModuleId::Index)
    }
}
