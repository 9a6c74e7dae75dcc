//! Content hashing via xxh3.

use std::path::Path;

use xxhash_rust::xxh3::xxh3_64;

/// Compute the xxh3 64-bit hash of file content.
#[inline]
pub fn hash_content(content: &[u8]) -> u64 {
    xxh3_64(content)
}

/// Hex digest of the file at `path`, empty when it cannot be read.
pub fn hash_file(path: &Path) -> String {
    match std::fs::read(path) {
        Ok(content) => format!("{:016x}", hash_content(&content)),
        Err(_) => String::new(),
    }
}
