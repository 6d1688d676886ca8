//! Catalog listing: fetching and parsing into work descriptors.
//!
//! The catalog is an S3 `ListBucketResult` document. Only `.jpg` objects
//! qualify; everything else is dropped without error.

use serde::Deserialize;
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::types::WorkDescriptor;
use crate::utils::is_safe_relative_name;

/// Only objects with this (case-sensitive) suffix are ingested
pub const SUPPORTED_EXTENSION: &str = ".jpg";

#[derive(Debug, Deserialize)]
struct ListBucketResult {
    #[serde(rename = "Contents", default)]
    contents: Vec<ListEntry>,
}

#[derive(Debug, Deserialize)]
struct ListEntry {
    #[serde(rename = "Key")]
    key: String,
    /// Kept as text until the entry is known to qualify
    #[serde(rename = "Size")]
    size: String,
    #[serde(rename = "ETag", default)]
    etag: String,
}

/// Fetch the catalog from `url` and parse it
///
/// # Errors
///
/// Returns [`Error::Transport`] when the request fails or the status is not a
/// success, and [`Error::Manifest`] when the body cannot be parsed.
pub async fn fetch_manifest(client: &reqwest::Client, url: &str) -> Result<Vec<WorkDescriptor>> {
    tracing::info!(url = %url, "Fetching catalog");

    let response = client.get(url).send().await.map_err(|e| {
        let msg = if e.is_timeout() {
            format!("timeout fetching catalog '{}'", url)
        } else if e.is_connect() {
            format!("connection failed for catalog '{}': {}", url, e)
        } else {
            format!("failed to fetch catalog '{}': {}", url, e)
        };
        Error::Transport(msg)
    })?;

    if !response.status().is_success() {
        return Err(Error::Transport(format!(
            "catalog '{}' returned status {}",
            url,
            response.status()
        )));
    }

    let body = response.text().await.map_err(|e| {
        Error::Transport(format!("failed to read catalog body from '{}': {}", url, e))
    })?;

    parse_manifest(&body)
}

/// Parse a catalog document into descriptors, in document order
///
/// Entries are dropped when the key does not end in [`SUPPORTED_EXTENSION`],
/// when the key would escape the image directory, or when an earlier entry
/// already used the same key.
pub fn parse_manifest(xml: &str) -> Result<Vec<WorkDescriptor>> {
    let listing: ListBucketResult =
        quick_xml::de::from_str(xml).map_err(|e| Error::Manifest(e.to_string()))?;

    let total = listing.contents.len();
    let mut seen = HashSet::new();
    let mut descriptors = Vec::with_capacity(total);

    for entry in listing.contents {
        if !entry.key.ends_with(SUPPORTED_EXTENSION) {
            tracing::debug!(name = %entry.key, "Ignoring unsupported extension");
            continue;
        }
        if !is_safe_relative_name(&entry.key) {
            tracing::warn!(name = %entry.key, "Ignoring entry that escapes the image directory");
            continue;
        }
        if !seen.insert(entry.key.clone()) {
            tracing::warn!(name = %entry.key, "Ignoring duplicate catalog entry");
            continue;
        }

        let expected_size = entry.size.trim().parse::<u64>().map_err(|e| {
            Error::Manifest(format!("invalid size '{}' for '{}': {}", entry.size, entry.key, e))
        })?;

        descriptors.push(WorkDescriptor {
            content_hash: entry.etag.replace('"', ""),
            name: entry.key,
            expected_size,
        });
    }

    tracing::info!(
        total,
        qualifying = descriptors.len(),
        "Parsed catalog"
    );

    Ok(descriptors)
}
