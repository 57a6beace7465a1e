//! Content fingerprints.
//!
//! A fingerprint is the lowercase hex SHA-256 of a canonical serialization.
//! Bodies are hashed verbatim; editable metadata is hashed over its YAML
//! encoding, which is also exactly what the cache writes to disk.

use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::post::EditableMetadata;

/// SHA-256 of `payload`, hex encoded.
pub fn hash(payload: &[u8]) -> String {
    format!("{:x}", Sha256::digest(payload))
}

/// Fingerprint of a post body.
pub fn content_hash(body: &str) -> String {
    hash(body.as_bytes())
}

/// Canonical text encoding of editable metadata.
///
/// Every field is always emitted, in declaration order, with `null` for
/// absent values, so equal values encode to identical bytes.
pub fn serialize_metadata(meta: &EditableMetadata) -> Result<String> {
    Ok(serde_yaml::to_string(meta)?)
}

/// Parse the encoding produced by [`serialize_metadata`] (or a hand-edited copy of it).
pub fn deserialize_metadata(text: &str) -> std::result::Result<EditableMetadata, serde_yaml::Error> {
    if text.trim().is_empty() {
        return Ok(EditableMetadata::default());
    }
    serde_yaml::from_str(text)
}

/// Fingerprint of editable metadata.
pub fn metadata_hash(meta: &EditableMetadata) -> Result<String> {
    Ok(hash(serialize_metadata(meta)?.as_bytes()))
}
