//! # exif-harvest
//!
//! Mirrors a public bucket of JPEG photographs to local disk and records each
//! image's EXIF fields in a key-value store keyed by the object's content hash.
//!
//! ## Design Philosophy
//!
//! - **Idempotent** - A run only does the work the store and the local blob
//!   cache say is still missing; re-running after a crash resumes cleanly
//! - **Bounded** - At most `max_concurrent` items are fetched and parsed at once
//! - **Per-item failures** - A bad object is reported and skipped for the run,
//!   it never takes the run down
//! - **Event-driven** - Consumers subscribe to events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use exif_harvest::{Config, Ingester};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ingester = Ingester::open(Config::default()).await?;
//!
//!     let mut events = ingester.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let report = ingester.run().await?;
//!     println!("stored {} of {}", report.stored, report.discovered);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Database persistence layer
pub mod db;
/// Error types
pub mod error;
/// Ingestion pipeline (decomposed into focused submodules)
pub mod ingest;
/// Store lookups
pub mod lookup;
/// Catalog reading
pub mod manifest;
/// Metadata store interface
pub mod store;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use db::Database;
pub use error::{DatabaseError, Error, Result};
pub use ingest::{
    ExifParser, ImageCrateInspector, ImageDescriptor, ImageInspector, Ingester, MetadataParser,
};
pub use lookup::{LookupOutcome, LookupRequest, lookup, run_lookup};
pub use store::MetadataStore;
pub use types::{
    Action, Event, FailureReason, ItemOutcome, MetadataRecord, RunReport, WorkDescriptor,
};
