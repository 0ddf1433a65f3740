//! Document fingerprints for `ComplianceReport::document_hash`.
//!
//! Two payloads that describe the same creative hash the same, whatever key
//! order or whitespace they arrived with. Reports can be cached by this hash.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::document::CreativeDocument;

/// JSON with object keys in sorted order and no whitespace.
///
/// Going through [`serde_json::Value`] sorts keys: its map is a `BTreeMap`
/// unless `preserve_order` is enabled, which this crate does not do.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_value(value).and_then(|v| serde_json::to_string(&v))
}

/// Lowercase hex SHA-256 of the creative's canonical JSON.
pub fn document_hash(doc: &CreativeDocument) -> Result<String, serde_json::Error> {
    let digest = Sha256::digest(canonical_json(doc)?.as_bytes());
    Ok(hex::encode(digest))
}
