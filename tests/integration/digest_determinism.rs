//! Determinism guarantees of the root digest

use super::support::{build_tree, scan_blocking};
use tempfile::TempDir;
use treehash::scan::ScanOptions;

const TREE: &[(&str, &str)] = &[
    ("a.txt", "alpha"),
    ("b.txt", "bravo"),
    ("z_last.txt", "zulu"),
    ("sub/c.txt", "charlie"),
    ("sub/deeper/d.txt", "delta"),
    ("sub/deeper/e.txt", "echo"),
    ("other/f.txt", "foxtrot"),
    ("other/g.txt", "golf"),
];

/// Repeated scans of an unchanged tree yield the same digest regardless of
/// task scheduling. Every run uses a fresh multi-threaded runtime so the
/// completion order of walk and hash tasks varies between runs.
#[test]
fn repeated_scans_produce_identical_digests() {
    let temp_dir = TempDir::new().unwrap();
    build_tree(temp_dir.path(), TREE);

    let baseline = scan_blocking(&ScanOptions::new(temp_dir.path())).unwrap();

    // Varying the concurrency cap and buffer size perturbs task interleaving
    // from run to run; the digest must not notice.
    for run in 0..20 {
        let options = ScanOptions::new(temp_dir.path())
            .with_max_io(1 + run % 5)
            .with_buffer_size(1 << (run % 8));
        let report = scan_blocking(&options).unwrap();
        assert_eq!(report.digest, baseline.digest);
        assert_eq!(report.files, baseline.files);
    }
}

/// The digest is independent of where the tree is rooted.
#[test]
fn identical_trees_at_different_roots_match() {
    let one = TempDir::new().unwrap();
    let two = TempDir::new().unwrap();
    build_tree(one.path(), TREE);
    build_tree(two.path(), TREE);

    let report_one = scan_blocking(&ScanOptions::new(one.path())).unwrap();
    let report_two = scan_blocking(&ScanOptions::new(two.path())).unwrap();

    assert_eq!(report_one.digest, report_two.digest);
}

/// An empty tree digests to a fixed, reproducible value.
#[test]
fn empty_tree_digest_is_reproducible() {
    let one = TempDir::new().unwrap();
    let two = TempDir::new().unwrap();

    let report_one = scan_blocking(&ScanOptions::new(one.path())).unwrap();
    let report_two = scan_blocking(&ScanOptions::new(two.path())).unwrap();

    assert!(report_one.files.is_empty());
    assert_eq!(report_one.digest, report_two.digest);
}

/// Reported records are sorted byte-wise by path.
#[test]
fn records_are_sorted_by_path() {
    let temp_dir = TempDir::new().unwrap();
    build_tree(temp_dir.path(), TREE);

    let report = scan_blocking(&ScanOptions::new(temp_dir.path())).unwrap();
    let paths: Vec<_> = report.files.iter().map(|r| r.path.clone()).collect();
    let mut sorted = paths.clone();
    sorted.sort_by(|a, b| a.as_bytes().cmp(b.as_bytes()));

    assert_eq!(paths, sorted);
    assert_eq!(paths.len(), TREE.len());
}

/// Throttling concurrency must not change the result.
#[test]
fn digest_is_independent_of_io_concurrency() {
    let temp_dir = TempDir::new().unwrap();
    build_tree(temp_dir.path(), TREE);

    let wide = scan_blocking(&ScanOptions::new(temp_dir.path())).unwrap();
    let narrow = scan_blocking(&ScanOptions::new(temp_dir.path()).with_max_io(1)).unwrap();

    assert_eq!(wide.digest, narrow.digest);
}

/// The read buffer size must not change the result.
#[test]
fn digest_is_independent_of_buffer_size() {
    let temp_dir = TempDir::new().unwrap();
    build_tree(temp_dir.path(), TREE);

    let large = scan_blocking(&ScanOptions::new(temp_dir.path())).unwrap();
    let small = scan_blocking(&ScanOptions::new(temp_dir.path()).with_buffer_size(3)).unwrap();

    assert_eq!(large.digest, small.digest);
}

/// Stripping an ancestor prefix leads every reported path with the part of
/// the root below it, and the digest reflects that.
#[test]
fn strip_prefix_controls_reported_paths() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("nested");
    build_tree(&nested, &[("a.txt", "alpha")]);

    let plain = scan_blocking(&ScanOptions::new(&nested)).unwrap();
    let prefixed =
        scan_blocking(&ScanOptions::new(&nested).with_strip_prefix(temp_dir.path())).unwrap();

    assert_eq!(plain.files[0].path, "a.txt");
    assert_eq!(prefixed.files[0].path, "nested/a.txt");
    assert_ne!(plain.digest, prefixed.digest);
}
