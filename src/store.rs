//! Metadata store interface
//!
//! The pipeline and the lookup path only talk to the store through
//! [`MetadataStore`]; [`Database`](crate::db::Database) is the SQLite-backed
//! implementation. Records live under `i:{content_hash}` as flat
//! field → value maps.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::MetadataRecord;

/// Prefix of every metadata key
pub const KEY_PREFIX: &str = "i:";

/// Store key for a content hash
pub fn metadata_key(content_hash: &str) -> String {
    format!("{}{}", KEY_PREFIX, content_hash)
}

/// Flatten a record into alternating field/value pairs.
///
/// `{ "a": "4", "b": "8" }` becomes `["a", "4", "b", "8"]`.
pub fn flatten_fields(record: &MetadataRecord) -> Vec<String> {
    record
        .iter()
        .flat_map(|(field, value)| [field.clone(), value.clone()])
        .collect()
}

/// Regroup alternating field/value pairs into a record.
///
/// A trailing field without a value is ignored.
pub fn group_pairs(pairs: &[String]) -> MetadataRecord {
    pairs
        .chunks_exact(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect()
}

/// Key-value persistence used by the resolver, the store writer and lookups
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Whether any field is stored under `key`
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Set every field of `pairs` (alternating field/value) on `key` atomically.
    ///
    /// Existing fields with the same name are overwritten; other fields are kept.
    async fn set_fields(&self, key: &str, pairs: &[String]) -> Result<()>;

    /// Value of one field, or `None` if the key or field is absent
    async fn get_field(&self, key: &str, field: &str) -> Result<Option<String>>;

    /// Every field of `key`, or `None` if the key is absent
    async fn get_all(&self, key: &str) -> Result<Option<MetadataRecord>>;

    /// Release the underlying connection. Safe to call more than once.
    async fn close(&self);
}
