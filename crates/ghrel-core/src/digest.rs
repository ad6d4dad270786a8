//! SHA-256 digests of downloaded files.
//!
//! Runs after all transfers have joined, one file at a time, streaming in
//! fixed-size chunks so memory use does not grow with the asset size.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::{GhrelError, Result};

const BUF_SIZE: usize = 64 * 1024;

/// Length in bytes of a SHA-256 digest.
pub const SHA256_LEN: usize = 32;

/// Hash everything `reader` yields and return the raw digest.
pub fn sha256_reader<R: Read>(mut reader: R) -> io::Result<[u8; SHA256_LEN]> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().into())
}

/// Compute SHA-256 of a file and return the raw digest bytes.
pub fn sha256_path_bytes(path: &Path) -> Result<[u8; SHA256_LEN]> {
    let f = File::open(path).map_err(|e| GhrelError::io(path, e))?;
    sha256_reader(f).map_err(|e| GhrelError::Compute {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Compute SHA-256 of a file and return the digest as lowercase hex.
pub fn sha256_path(path: &Path) -> Result<String> {
    sha256_path_bytes(path).map(hex::encode)
}
