//! Shared helpers for integration tests

use std::fs;
use std::path::Path;
use treehash::error::ScanError;
use treehash::scan::{scan, ScanOptions, ScanReport};

/// Create files under `root` from (relative path, content) pairs.
pub fn build_tree(root: &Path, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

/// Run one scan to completion on a fresh multi-threaded runtime.
pub fn scan_blocking(options: &ScanOptions) -> Result<ScanReport, ScanError> {
    tokio::runtime::Runtime::new()
        .unwrap()
        .block_on(scan(options))
}
