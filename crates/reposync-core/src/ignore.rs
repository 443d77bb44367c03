//! `.gitignore` management.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Ignore file name, relative to the working tree root.
pub const IGNORE_FILE: &str = ".gitignore";

/// Patterns currently in the ignore file, skipping blanks and comments.
///
/// A missing file yields an empty list.
///
/// # Errors
/// Returns an error if the file exists but cannot be read.
pub fn list_patterns(workdir: &Path) -> Result<Vec<String>> {
    let path = workdir.join(IGNORE_FILE);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(&path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect())
}

/// Append patterns not already present, creating the file if needed.
///
/// Returns the patterns actually added, in input order.
///
/// # Errors
/// Returns `InvalidPattern` if a pattern spans lines, or an I/O error.
pub fn add_patterns<I, S>(workdir: &Path, patterns: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let path = workdir.join(IGNORE_FILE);
    let existing = if path.exists() {
        fs::read_to_string(&path)?
    } else {
        String::new()
    };
    let mut known: Vec<String> = existing.lines().map(|l| l.trim().to_string()).collect();

    let mut added = Vec::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        if pattern.contains(['\n', '\r']) {
            return Err(Error::InvalidPattern(pattern.to_string()));
        }
        let pattern = pattern.trim();
        if pattern.is_empty() || known.iter().any(|k| k == pattern) {
            continue;
        }
        known.push(pattern.to_string());
        added.push(pattern.to_string());
    }

    if added.is_empty() {
        return Ok(added);
    }

    let mut content = existing;
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    for pattern in &added {
        content.push_str(pattern);
        content.push('\n');
    }
    fs::write(&path, content)?;
    tracing::info!(count = added.len(), "updated {IGNORE_FILE}");
    Ok(added)
}
