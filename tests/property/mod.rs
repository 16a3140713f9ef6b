//! Property-based tests for the treehash digest engine

mod determinism;
