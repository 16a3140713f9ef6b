//! Property-based tests for digest determinism over generated trees

use proptest::prelude::*;
use proptest::test_runner::{Config, TestRunner};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use treehash::scan::{scan, ScanOptions, ScanReport};

fn scan_blocking(options: &ScanOptions) -> ScanReport {
    tokio::runtime::Runtime::new()
        .unwrap()
        .block_on(scan(options))
        .unwrap()
}

fn materialize(root: &Path, tree: &BTreeMap<String, Vec<u8>>) {
    for (rel, content) in tree {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

/// A small tree of files spread over a fixed set of directories. File names
/// start with `f` and directory names with `d`, so a generated file can never
/// collide with a directory component.
fn tree_strategy() -> impl Strategy<Value = BTreeMap<String, Vec<u8>>> {
    let location = prop_oneof![Just(""), Just("d1"), Just("d1/d2"), Just("d3")];
    let rel_path = (location, "f[a-z]{1,7}").prop_map(|(dir, name)| {
        if dir.is_empty() {
            name
        } else {
            format!("{}/{}", dir, name)
        }
    });
    proptest::collection::btree_map(rel_path, proptest::collection::vec(any::<u8>(), 0..128), 1..10)
}

fn runner() -> TestRunner {
    TestRunner::new(Config {
        cases: 16,
        ..Config::default()
    })
}

/// Any generated tree digests identically across rebuilds, across reruns, and
/// across filesystem locations.
#[test]
fn generated_trees_digest_deterministically() {
    runner()
        .run(&tree_strategy(), |tree| {
            let here = TempDir::new().unwrap();
            let there = TempDir::new().unwrap();
            materialize(here.path(), &tree);
            materialize(there.path(), &tree);

            let first = scan_blocking(&ScanOptions::new(here.path()));
            let second = scan_blocking(&ScanOptions::new(here.path()));
            let elsewhere = scan_blocking(&ScanOptions::new(there.path()));

            prop_assert_eq!(first.digest, second.digest);
            prop_assert_eq!(first.digest, elsewhere.digest);
            prop_assert_eq!(first.files.len(), tree.len());
            Ok(())
        })
        .unwrap();
}

/// Renaming any one file changes the digest even though content is unchanged.
#[test]
fn renaming_any_file_changes_the_digest() {
    runner()
        .run(&tree_strategy(), |tree| {
            let temp_dir = TempDir::new().unwrap();
            materialize(temp_dir.path(), &tree);
            let options = ScanOptions::new(temp_dir.path());

            let before = scan_blocking(&options);

            let original = tree.keys().next().unwrap();
            fs::rename(
                temp_dir.path().join(original),
                temp_dir.path().join("g_renamed"),
            )
            .unwrap();
            let after = scan_blocking(&options);

            prop_assert_ne!(before.digest, after.digest);
            Ok(())
        })
        .unwrap();
}
