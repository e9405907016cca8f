//! Content hashing used as the integrity gate for downloads.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use crate::domain::FetchError;

/// Lowercase hex SHA-256 of the file at `path`, streamed through a buffered reader.
pub fn sha256_path(path: &Path) -> io::Result<String> {
    let mut reader = BufReader::with_capacity(64 * 1024, File::open(path)?);
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Compare the checksum a transfer reported with the one recomputed from disk.
pub fn verify(reported: &str, local: &str) -> Result<(), FetchError> {
    if reported.eq_ignore_ascii_case(local) {
        Ok(())
    } else {
        Err(FetchError::Corrupted {
            reported: reported.to_string(),
            local: local.to_string(),
        })
    }
}
