//! Idempotency decision: what does a catalog entry still need?

use std::path::Path;

use crate::error::Result;
use crate::store::{MetadataStore, metadata_key};
use crate::types::{Action, WorkDescriptor};
use crate::utils::blob_path;

use super::Ingester;

/// Classify a descriptor against the store and the local image directory
///
/// 1. A hash already in the store is [`Action::Skip`], whatever is on disk.
/// 2. No local file is [`Action::Fetch`].
/// 3. A local file of exactly `expected_size` bytes is [`Action::ExtractOnly`].
/// 4. Any other size is [`Action::Fetch`] (partial or corrupt download).
///
/// # Errors
///
/// Store failures and stat failures other than "not found" are returned as-is.
pub async fn classify(
    store: &dyn MetadataStore,
    image_dir: &Path,
    descriptor: &WorkDescriptor,
) -> Result<Action> {
    let key = metadata_key(&descriptor.content_hash);
    if store.exists(&key).await? {
        tracing::info!(
            name = %descriptor.name,
            key = %key,
            "Skipping, store already has the hash"
        );
        return Ok(Action::Skip);
    }

    let path = blob_path(image_dir, &descriptor.name);
    let metadata = match tokio::fs::metadata(&path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(name = %descriptor.name, "Not seen before, queueing download");
            return Ok(Action::Fetch);
        }
        Err(e) => return Err(e.into()),
    };

    tracing::debug!(
        name = %descriptor.name,
        expected = descriptor.expected_size,
        actual = metadata.len(),
        "Found local copy"
    );

    if metadata.is_file() && metadata.len() == descriptor.expected_size {
        tracing::info!(name = %descriptor.name, "Local copy is complete, extracting only");
        Ok(Action::ExtractOnly)
    } else {
        tracing::info!(
            name = %descriptor.name,
            expected = descriptor.expected_size,
            actual = metadata.len(),
            "Local copy is incomplete, downloading again"
        );
        Ok(Action::Fetch)
    }
}

impl Ingester {
    /// Classify a descriptor using this ingester's store and image directory
    pub(crate) async fn classify(&self, descriptor: &WorkDescriptor) -> Result<Action> {
        classify(self.store.as_ref(), self.config.image_dir(), descriptor).await
    }
}
