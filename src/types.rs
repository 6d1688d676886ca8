//! Core types for exif-harvest

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata extracted from one image: field name → text value
pub type MetadataRecord = BTreeMap<String, String>;

/// One catalog entry's parsed identity
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkDescriptor {
    /// Object name, also the file name under the image directory
    pub name: String,
    /// Size advertised by the catalog, in bytes
    pub expected_size: u64,
    /// Integrity tag with quotes stripped; the store key and idempotency token
    pub content_hash: String,
}

/// What a descriptor needs before its metadata is durable
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// The store already has this hash
    Skip,
    /// The blob is on disk with the expected size; extraction only
    ExtractOnly,
    /// The blob is missing or incomplete and must be (re)downloaded
    Fetch,
}

/// A descriptor together with the resolver's decision
#[derive(Clone, Debug)]
pub struct ClassifiedItem {
    /// The catalog entry
    pub descriptor: WorkDescriptor,
    /// Required action (never [`Action::Skip`] once queued)
    pub action: Action,
}

/// Why an item was abandoned for this run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// Connection failure, timeout or broken body stream
    Transport(String),
    /// Status other than 200
    HttpStatus(u16),
    /// Missing or unsupported content type
    ContentType(Option<String>),
    /// The body could not be written to the image directory
    Storage(String),
    /// The bytes on disk are not a JPEG; carries the reported format (may be empty)
    FormatMismatch(String),
    /// EXIF could not be read from a genuine JPEG
    MetadataParse(String),
    /// The store rejected the write
    StoreWrite(String),
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Transport(e) => write!(f, "transport error: {}", e),
            FailureReason::HttpStatus(code) => write!(f, "unexpected status code {}", code),
            FailureReason::ContentType(Some(ct)) => write!(f, "unsupported content type '{}'", ct),
            FailureReason::ContentType(None) => write!(f, "missing content type"),
            FailureReason::Storage(e) => write!(f, "local write failed: {}", e),
            FailureReason::FormatMismatch(format) => write!(f, "not a valid JPEG: [{}]", format),
            FailureReason::MetadataParse(e) => write!(f, "EXIF parse failed: {}", e),
            FailureReason::StoreWrite(e) => write!(f, "store write failed: {}", e),
        }
    }
}

/// Result of processing one queued item
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Metadata was written; carries the number of fields stored
    Stored {
        /// Number of fields written under the content hash
        fields: usize,
    },
    /// The item was abandoned for this run
    Rejected(FailureReason),
}

/// Summary of one pipeline run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Qualifying catalog entries
    pub discovered: usize,
    /// Entries the store already knew
    pub skipped: usize,
    /// Entries handed to the work queue
    pub submitted: usize,
    /// Submitted entries that needed a download
    pub fetched: usize,
    /// Submitted entries that were already on disk
    pub extract_only: usize,
    /// Entries whose metadata was written
    pub stored: usize,
    /// Entries abandoned for this run
    pub failed: usize,
    /// Name and reason of every abandoned entry
    pub failures: Vec<(String, FailureReason)>,
}

impl RunReport {
    /// Account for a classification decision
    pub(crate) fn record_action(&mut self, action: Action) {
        match action {
            Action::Skip => self.skipped += 1,
            Action::ExtractOnly => {
                self.submitted += 1;
                self.extract_only += 1;
            }
            Action::Fetch => {
                self.submitted += 1;
                self.fetched += 1;
            }
        }
    }

    /// Account for a finished item
    pub(crate) fn record_outcome(&mut self, name: String, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Stored { .. } => self.stored += 1,
            ItemOutcome::Rejected(reason) => {
                self.failed += 1;
                self.failures.push((name, reason));
            }
        }
    }

    /// Number of items that finished, successfully or not
    pub fn completed(&self) -> usize {
        self.stored + self.failed
    }
}

/// Event emitted during a run
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The resolver decided what an entry needs
    Classified {
        /// Object name
        name: String,
        /// Decision
        action: Action,
    },

    /// Metadata was written for an entry
    Stored {
        /// Object name
        name: String,
        /// Store key suffix
        content_hash: String,
        /// Number of fields written
        fields: usize,
    },

    /// An entry was abandoned for this run
    Failed {
        /// Object name
        name: String,
        /// Why
        reason: FailureReason,
    },

    /// Every submitted item has completed and the store was released
    Drained {
        /// Final counts
        report: RunReport,
    },
}
