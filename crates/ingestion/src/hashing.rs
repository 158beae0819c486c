//! Content identifiers
//!
//! A paper's id is the SHA-256 of its bytes, hex encoded (64 chars).

use crate::errors::IngestionError;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// Length of a content id in hex characters
pub const CONTENT_ID_LEN: usize = 64;

/// Content id of an in-memory buffer
pub fn content_id(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Content id of a file, streamed from disk. Read failures are returned as-is.
pub fn hash_file(path: &Path) -> Result<String, IngestionError> {
    let file = File::open(path).map_err(|e| IngestionError::io(path, e))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher).map_err(|e| IngestionError::io(path, e))?;
    Ok(hex::encode(hasher.finalize()))
}
