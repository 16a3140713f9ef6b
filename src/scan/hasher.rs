//! Streaming file content hashing using BLAKE3

use crate::types::Digest;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Default read buffer size (1 MiB).
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Hash the content of the file at `path`, streaming through a fixed-size
/// read buffer so large files are never loaded into memory whole.
pub fn hash_file(path: &Path, buffer_size: usize) -> io::Result<Digest> {
    let mut file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; buffer_size.max(1)];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(*hasher.finalize().as_bytes())
}
