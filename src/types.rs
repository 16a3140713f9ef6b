//! Shared types for tree digesting.

/// 32-byte BLAKE3 digest.
pub type Digest = [u8; 32];
