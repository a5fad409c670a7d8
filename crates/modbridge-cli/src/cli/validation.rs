//! Value parsers for command-line arguments.

/// A bundle name is used in file names and in the registry id.
pub fn parse_bundle_name(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        return Err("Bundle name cannot be empty".to_string());
    }
    if let Some(c) = s.chars().find(|c| matches!(c, ':' | '/' | '\\') || c.is_whitespace()) {
        return Err(format!(
            "Bundle name cannot contain '{}': '{}'",
            c.escape_default(),
            s
        ));
    }
    Ok(s.to_string())
}

/// Registry namespaces are the part before `:` in a registry id.
pub fn parse_namespace(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("Namespace cannot be empty".to_string());
    }
    if s.contains(':') {
        return Err(format!("Namespace cannot contain ':': '{}'", s));
    }
    Ok(s.to_string())
}
