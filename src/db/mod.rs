//! Database layer for exif-harvest
//!
//! SQLite persistence for extracted metadata. One row per `(key, field)`, so a
//! key behaves like a hash of text fields.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] - Database lifecycle, schema migrations
//! - [`metadata`] - Field-level reads and writes, [`MetadataStore`](crate::store::MetadataStore) impl

use sqlx::sqlite::SqlitePool;

mod metadata;
mod migrations;

/// Database handle for exif-harvest
pub struct Database {
    pool: SqlitePool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
