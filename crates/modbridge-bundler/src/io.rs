//! Reading and writing bundles.
//!
//! A bundle is the bundler's flat interchange format: a JSON array of module
//! records. Writes go through a temporary file and a rename so a failed run
//! never leaves a half-written bundle behind, nor a bundle without the
//! metadata written alongside it.

use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;

use crate::{Error, ModuleRecord, Result};

/// Parse a bundle from JSON text.
///
/// ```
/// use modbridge_bundler::{ModuleId, parse_bundle};
///
/// let records = parse_bundle(r#"[{"id": 1, "source": "", "deps": {}, "entry": true}]"#).unwrap();
/// assert_eq!(records[0].id, ModuleId::Index(1));
/// assert!(records[0].entry);
/// ```
pub fn parse_bundle(json: &str) -> Result<Vec<ModuleRecord>> {
    serde_json::from_str(json).map_err(|e| Error::InvalidBundle(e.to_string()))
}

/// Read and parse a bundle file.
pub fn read_bundle(path: &Path) -> Result<Vec<ModuleRecord>> {
    let json = fs::read_to_string(path)
        .map_err(|e| Error::io(format!("Failed to read bundle '{}'", path.display()), e))?;
    parse_bundle(&json).map_err(|e| match e {
        Error::InvalidBundle(message) => {
            Error::InvalidBundle(format!("{}: {message}", path.display()))
        }
        other => other,
    })
}

/// Serialize records back into the interchange format.
pub fn serialize_bundle(records: &[ModuleRecord], pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(records)
    } else {
        serde_json::to_string(records)
    };
    json.map_err(|e| Error::InvalidBundle(format!("Failed to serialize bundle: {e}")))
}

/// Serialize `records` and write them to `path`.
pub fn write_bundle(path: &Path, records: &[ModuleRecord], pretty: bool) -> Result<()> {
    let json = serialize_bundle(records, pretty)?;
    write_file(path, json.as_bytes())
}

/// Atomically write `contents` to `path`, creating parent directories.
pub fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    write_files(&[(path, contents)])
}

/// Write several files so that either all of them land or none do.
///
/// Every file is staged next to its target first. Targets are only replaced
/// once all staging succeeded; a failed stage removes the ones before it.
pub fn write_files(files: &[(&Path, &[u8])]) -> Result<()> {
    let targets = files
        .iter()
        .map(|(path, _)| normalize_output_path(path))
        .collect::<Result<Vec<_>>>()?;

    let mut staged: Vec<PathBuf> = Vec::with_capacity(files.len());
    for (target, (_, contents)) in targets.iter().zip(files) {
        match stage(target, contents) {
            Ok(temp) => staged.push(temp),
            Err(e) => {
                discard(&staged);
                return Err(e);
            }
        }
    }

    for (index, (temp, target)) in staged.iter().zip(&targets).enumerate() {
        if let Err(e) = fs::rename(temp, target) {
            discard(&staged[index..]);
            return Err(Error::WriteFailure(format!(
                "Failed to rename '{}' to '{}': {}",
                temp.display(),
                target.display(),
                e
            )));
        }
        tracing::debug!(path = %target.display(), "wrote file");
    }
    Ok(())
}

/// Write `contents` to the temporary sibling of `target`.
fn stage(target: &Path, contents: &[u8]) -> Result<PathBuf> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            Error::WriteFailure(format!(
                "Failed to create directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let temp = temp_path(target);
    fs::write(&temp, contents).map_err(|e| {
        Error::WriteFailure(format!(
            "Failed to write temporary file '{}': {}",
            temp.display(),
            e
        ))
    })?;
    Ok(temp)
}

fn discard(staged: &[PathBuf]) {
    for temp in staged {
        if let Err(cleanup) = fs::remove_file(temp) {
            tracing::warn!(path = %temp.display(), error = %cleanup, "failed to clean up temporary file");
        }
    }
}

/// Clean the path and make sure it names a file.
fn normalize_output_path(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().to_string_lossy().contains('\0') {
        return Err(Error::InvalidOutputPath(
            "Path contains null byte".to_string(),
        ));
    }

    let cleaned = path.clean();
    if cleaned.file_name().is_none() || cleaned.is_dir() {
        return Err(Error::InvalidOutputPath(cleaned.display().to_string()));
    }
    Ok(cleaned)
}

fn temp_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    target.with_file_name(name)
}
