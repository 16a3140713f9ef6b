//! Relative path construction and normalization for deterministic reports

use crate::error::ScanError;
use std::path::{Component, Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Canonicalize the scan root and compute the relative path reports start
/// from.
///
/// With no prefix configured, reported paths are relative to the root itself.
/// A configured prefix must be an ancestor of the root (or the root itself);
/// the part of the root below it then leads every reported path.
pub(crate) fn resolve_root(
    root: &Path,
    strip_prefix: Option<&Path>,
) -> Result<(PathBuf, String), ScanError> {
    let canonical_root = dunce::canonicalize(root).map_err(|e| {
        ScanError::InvalidPath(format!("failed to resolve {}: {}", root.display(), e))
    })?;

    let base = match strip_prefix {
        None => String::new(),
        Some(prefix) => {
            let canonical_prefix = dunce::canonicalize(prefix).map_err(|e| {
                ScanError::InvalidPath(format!("failed to resolve {}: {}", prefix.display(), e))
            })?;
            let below = canonical_root.strip_prefix(&canonical_prefix).map_err(|_| {
                ScanError::InvalidPath(format!(
                    "{} is not an ancestor of {}",
                    canonical_prefix.display(),
                    canonical_root.display()
                ))
            })?;
            relative_string(below)
        }
    };

    Ok((canonical_root, base))
}

/// Join a relative parent path and an entry name with a single `/`.
pub(crate) fn join_relative(parent: &str, name: &str) -> String {
    let name = normalize(name);
    if parent.is_empty() {
        name
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Render a relative path with `/` separators and NFC-normalized components.
fn relative_string(path: &Path) -> String {
    let mut rendered = String::new();
    for component in path.components() {
        if let Component::Normal(name) = component {
            rendered = join_relative(&rendered, &name.to_string_lossy());
        }
    }
    rendered
}

/// Normalize Unicode to NFC so byte-wise path ordering (and the digest fold)
/// does not depend on how the filesystem encodes composed characters.
fn normalize(name: &str) -> String {
    name.nfc().collect()
}
