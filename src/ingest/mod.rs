//! Ingestion pipeline split into focused submodules.
//!
//! The `Ingester` struct and its methods are organized by stage:
//! - [`resolver`] - Idempotency decision per catalog entry
//! - [`queue`] - Bounded worker pool and drain detection
//! - [`task`] - Per-item context and orchestration
//! - [`fetch`] - HTTP fetch, status/content-type gates, streaming to disk
//! - [`extract`] - Format sniffing and EXIF parsing
//! - [`lifecycle`] - Run entry point and store release

mod extract;
mod fetch;
mod lifecycle;
mod queue;
mod resolver;
mod task;


pub use extract::{ExifParser, ImageCrateInspector, ImageDescriptor, ImageInspector, MetadataParser};
pub use fetch::JPEG_MEDIA_TYPE;
pub use resolver::classify;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::config::Config;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::store::MetadataStore;
use crate::types::Event;

/// Catalog ingester (cloneable - all fields are Arc-wrapped or cheap handles)
///
/// One `Ingester` performs one run: [`run`](Self::run) releases the store when
/// the queue drains, so a fresh ingester (and store connection) is needed for
/// the next pass.
#[derive(Clone)]
pub struct Ingester {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Injected metadata store
    pub(crate) store: Arc<dyn MetadataStore>,
    /// HTTP client with the per-request deadline applied
    pub(crate) http: reqwest::Client,
    /// Format introspection (trait object for pluggable implementations)
    pub(crate) inspector: Arc<dyn ImageInspector>,
    /// Metadata parsing (trait object for pluggable implementations)
    pub(crate) parser: Arc<dyn MetadataParser>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Set by the first call to `run`, shared by every clone
    pub(crate) run_started: Arc<AtomicBool>,
    /// Set once the store has been closed
    pub(crate) store_released: Arc<AtomicBool>,
}

impl Ingester {
    /// Create an ingester around an existing store
    ///
    /// Uses [`ImageCrateInspector`] and [`ExifParser`]; replace them with
    /// [`with_inspector`](Self::with_inspector) / [`with_parser`](Self::with_parser).
    pub fn new(config: Config, store: Arc<dyn MetadataStore>) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.source.request_timeout)
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);

        Ok(Self {
            config: Arc::new(config),
            store,
            http,
            inspector: Arc::new(ImageCrateInspector),
            parser: Arc::new(ExifParser),
            event_tx,
            run_started: Arc::new(AtomicBool::new(false)),
            store_released: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Open the SQLite store named in the configuration and create an ingester around it
    pub async fn open(config: Config) -> Result<Self> {
        config.validate()?;
        let db = Database::new(&config.persistence.database_path).await?;
        Self::new(config, Arc::new(db))
    }

    /// Replace the format introspection utility
    pub fn with_inspector(mut self, inspector: Arc<dyn ImageInspector>) -> Self {
        self.inspector = inspector;
        self
    }

    /// Replace the metadata parser
    pub fn with_parser(mut self, parser: Arc<dyn MetadataParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Subscribe to run events
    ///
    /// Events are buffered; a subscriber more than 1000 events behind receives
    /// `RecvError::Lagged`.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Emit an event to all subscribers; dropped silently when nobody listens
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
