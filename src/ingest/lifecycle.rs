//! Run entry point and store release.

use std::sync::atomic::Ordering;

use crate::error::{Error, Result};
use crate::manifest::fetch_manifest;
use crate::types::{Event, RunReport};

use super::Ingester;

impl Ingester {
    /// Run one full pass: read the catalog, process every entry, release the store
    ///
    /// The store is closed exactly once whichever way the run ends. An ingester
    /// (and every clone of it) runs at most once.
    ///
    /// # Errors
    ///
    /// Returns an error if the image directory cannot be created, the catalog
    /// cannot be fetched or parsed, classification fails, or an item task
    /// panics.
    pub async fn run(&self) -> Result<RunReport> {
        if self.run_started.swap(true, Ordering::SeqCst) {
            return Err(Error::Other(
                "ingester already ran; create a new ingester for another run".to_string(),
            ));
        }

        let result = self.run_inner().await;
        self.release_store().await;

        match &result {
            Ok(report) => {
                tracing::info!(
                    discovered = report.discovered,
                    skipped = report.skipped,
                    fetched = report.fetched,
                    extract_only = report.extract_only,
                    stored = report.stored,
                    failed = report.failed,
                    "Run complete"
                );
                self.emit_event(Event::Drained {
                    report: report.clone(),
                });
            }
            Err(e) => tracing::error!(error = %e, "Run aborted"),
        }

        result
    }

    async fn run_inner(&self) -> Result<RunReport> {
        let image_dir = self.config.image_dir();
        tokio::fs::create_dir_all(image_dir).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create image directory {}: {}", image_dir.display(), e),
            ))
        })?;

        let descriptors = fetch_manifest(&self.http, &self.config.source.catalog_url).await?;

        self.process(descriptors).await
    }

    /// Close the store if nobody has yet
    pub(crate) async fn release_store(&self) {
        if self.store_released.swap(true, Ordering::SeqCst) {
            return;
        }
        self.store.close().await;
        tracing::debug!("Store released");
    }
}
