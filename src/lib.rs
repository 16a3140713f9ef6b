//! Treehash: Deterministic Directory Tree Digests
//!
//! Concurrently walks a directory tree, hashes every file's content with
//! BLAKE3, and folds the sorted per-file digests into a single root digest.
//! The digest is a change-detection primitive: identical trees always produce
//! identical digests, and any change to file content, names, or the file set
//! produces a different one.

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod scan;
pub mod types;
