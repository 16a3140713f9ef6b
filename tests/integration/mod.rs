//! Integration tests for the treehash digest engine

mod digest_determinism;
mod support;
