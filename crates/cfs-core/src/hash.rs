use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::CfsError;
use crate::serde::to_canonical_json_bytes;

/// Hex SHA-256 of the canonical JSON of `value`, truncated to `bytes` bytes.
pub fn short_hash_string<T: Serialize>(value: &T, bytes: usize) -> Result<String, CfsError> {
    let canonical = to_canonical_json_bytes(value)?;
    let digest = Sha256::digest(canonical);
    let keep = bytes.min(digest.len());
    Ok(hex::encode(&digest[..keep]))
}
