//! Per-item task context and orchestration.
//!
//! Validation order for one item: HTTP status → content type (fetch only) →
//! on-disk format sniff → metadata parse → store write. Every path returns
//! exactly one [`ItemOutcome`].

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::store::{MetadataStore, flatten_fields, metadata_key};
use crate::types::{Action, ClassifiedItem, FailureReason, ItemOutcome, WorkDescriptor};
use crate::utils::blob_path;

use super::Ingester;
use super::extract::{ImageInspector, MetadataParser};

/// Shared context for a single item task, reducing parameter passing between helpers.
pub(crate) struct ItemTaskContext {
    pub(crate) item: ClassifiedItem,
    pub(crate) path: PathBuf,
    pub(crate) config: Arc<Config>,
    pub(crate) http: reqwest::Client,
    pub(crate) store: Arc<dyn MetadataStore>,
    pub(crate) inspector: Arc<dyn ImageInspector>,
    pub(crate) parser: Arc<dyn MetadataParser>,
}

impl ItemTaskContext {
    pub(super) fn descriptor(&self) -> &WorkDescriptor {
        &self.item.descriptor
    }
}

impl Ingester {
    /// Build the context for one queued item
    pub(crate) fn task_context(&self, item: ClassifiedItem) -> ItemTaskContext {
        let path = blob_path(self.config.image_dir(), &item.descriptor.name);
        ItemTaskContext {
            item,
            path,
            config: Arc::clone(&self.config),
            http: self.http.clone(),
            store: Arc::clone(&self.store),
            inspector: Arc::clone(&self.inspector),
            parser: Arc::clone(&self.parser),
        }
    }
}

/// Run one queued item to completion
pub(crate) async fn run_item_task(ctx: ItemTaskContext) -> ItemOutcome {
    match process_item(&ctx).await {
        Ok(fields) => ItemOutcome::Stored { fields },
        Err(reason) => {
            tracing::warn!(
                name = %ctx.descriptor().name,
                reason = %reason,
                "Item abandoned for this run"
            );
            ItemOutcome::Rejected(reason)
        }
    }
}

async fn process_item(ctx: &ItemTaskContext) -> Result<usize, FailureReason> {
    if ctx.item.action == Action::Fetch {
        ctx.fetch_blob().await?;
    }

    let record = ctx.extract_metadata().await?;

    let key = metadata_key(&ctx.descriptor().content_hash);
    let pairs = flatten_fields(&record);
    ctx.store
        .set_fields(&key, &pairs)
        .await
        .map_err(|e| FailureReason::StoreWrite(e.to_string()))?;

    tracing::info!(
        name = %ctx.descriptor().name,
        key = %key,
        fields = record.len(),
        "Stored metadata"
    );

    Ok(record.len())
}
