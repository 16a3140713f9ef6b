//! Directory entry scanning

use std::io;
use std::path::{Path, PathBuf};

/// A classified child of a scanned directory.
#[derive(Debug, Clone)]
pub enum Entry {
    /// A regular file.
    File { path: PathBuf, name: String },
    /// A subdirectory.
    Directory { path: PathBuf, name: String },
}

/// List the immediate children of `dir`, classifying each as file or
/// directory.
///
/// Symlinks and special files are skipped: following links would make the
/// digest depend on state outside the tree and risks traversal loops.
pub async fn list_children(dir: &Path) -> io::Result<Vec<Entry>> {
    let mut children = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let file_type = entry.file_type().await?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();

        if file_type.is_file() {
            children.push(Entry::File { path, name });
        } else if file_type.is_dir() {
            children.push(Entry::Directory { path, name });
        }
    }

    Ok(children)
}
