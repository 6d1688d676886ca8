//! Read path over the metadata store
//!
//! Independent of the pipeline: every query opens its own connection, runs a
//! single read and closes the connection again.

use std::path::Path;

use crate::db::Database;
use crate::error::Result;
use crate::store::{MetadataStore, metadata_key};
use crate::types::MetadataRecord;

/// Help text printed when no key is given
pub const USAGE: &str = "Usage: exif-lookup hashkey [exifTag]
e.g.
 $ exif-lookup 04057962cae0c5952196a2eceb6a5715
 $ exif-lookup 04057962cae0c5952196a2eceb6a5715 ISO";

/// What the user asked for
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LookupRequest {
    /// No key, or too many arguments
    NoArgs,
    /// Every field stored for a content hash
    KeyOnly(String),
    /// A single field stored for a content hash
    KeyAndTag(String, String),
}

impl LookupRequest {
    /// Interpret user arguments (program name already removed)
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::into);
        match (args.next(), args.next(), args.next()) {
            (Some(key), None, _) => Self::KeyOnly(key),
            (Some(key), Some(tag), None) => Self::KeyAndTag(key, tag),
            _ => Self::NoArgs,
        }
    }
}

/// Result of one lookup, rendered with `Display`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The request carried no key
    Usage,
    /// All fields of a record
    Record(MetadataRecord),
    /// One field value
    Field(String),
    /// The key (or the key/tag pair) is absent
    NotFound {
        /// Content hash that was looked up
        key: String,
        /// Tag that was looked up, if any
        tag: Option<String>,
    },
}

impl std::fmt::Display for LookupOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupOutcome::Usage => f.write_str(USAGE),
            LookupOutcome::Record(record) => {
                let json = serde_json::to_string_pretty(record).map_err(|_| std::fmt::Error)?;
                write!(f, "results: {}", json)
            }
            LookupOutcome::Field(value) => {
                let json = serde_json::to_string(value).map_err(|_| std::fmt::Error)?;
                write!(f, "results: {}", json)
            }
            LookupOutcome::NotFound { key, tag: None } => write!(f, "key:[{}] not found", key),
            LookupOutcome::NotFound { key, tag: Some(tag) } => {
                write!(f, "key:[{}] with tag:[{}] not found", key, tag)
            }
        }
    }
}

/// Answer a request against an open store
pub async fn lookup(store: &dyn MetadataStore, request: &LookupRequest) -> Result<LookupOutcome> {
    match request {
        LookupRequest::NoArgs => Ok(LookupOutcome::Usage),
        LookupRequest::KeyOnly(key) => {
            tracing::debug!(key = %key, "Looking up record");
            Ok(match store.get_all(&metadata_key(key)).await? {
                Some(record) => LookupOutcome::Record(record),
                None => LookupOutcome::NotFound {
                    key: key.clone(),
                    tag: None,
                },
            })
        }
        LookupRequest::KeyAndTag(key, tag) => {
            tracing::debug!(key = %key, tag = %tag, "Looking up field");
            Ok(match store.get_field(&metadata_key(key), tag).await? {
                Some(value) => LookupOutcome::Field(value),
                None => LookupOutcome::NotFound {
                    key: key.clone(),
                    tag: Some(tag.clone()),
                },
            })
        }
    }
}

/// Open the existing database at `database_path`, answer one request and close it
///
/// # Errors
///
/// A missing database is an error rather than an empty store; nothing is
/// created at `database_path`.
pub async fn run_lookup(database_path: &Path, request: &LookupRequest) -> Result<LookupOutcome> {
    if *request == LookupRequest::NoArgs {
        return Ok(LookupOutcome::Usage);
    }

    let db = Database::open_existing(database_path).await?;
    let result = lookup(&db, request).await;
    db.close().await;
    result
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DatabaseError, Error};
    use crate::store::flatten_fields;
    use std::collections::BTreeMap;

    const HASH: &str = "04057962cae0c5952196a2eceb6a5715";

    fn sample() -> MetadataRecord {
        BTreeMap::from([
            ("FNumber".to_string(), "f/2.8".to_string()),
            ("ISO".to_string(), "400".to_string()),
        ])
    }

    async fn seeded_db(path: &Path) {
        let db = Database::new(path).await.unwrap();
        db.set_fields(&metadata_key(HASH), &flatten_fields(&sample()))
            .await
            .unwrap();
        db.close().await;
    }

    #[test]
    fn test_from_args() {
        assert_eq!(LookupRequest::from_args(Vec::<String>::new()), LookupRequest::NoArgs);
        assert_eq!(
            LookupRequest::from_args(["abc"]),
            LookupRequest::KeyOnly("abc".to_string())
        );
        assert_eq!(
            LookupRequest::from_args(["abc", "ISO"]),
            LookupRequest::KeyAndTag("abc".to_string(), "ISO".to_string())
        );
        assert_eq!(
            LookupRequest::from_args(["abc", "ISO", "extra"]),
            LookupRequest::NoArgs
        );
    }

    #[test]
    fn test_outcome_rendering() {
        assert_eq!(
            LookupOutcome::Field("400".to_string()).to_string(),
            "results: \"400\""
        );
        assert_eq!(
            LookupOutcome::Record(sample()).to_string(),
            "results: {\n  \"FNumber\": \"f/2.8\",\n  \"ISO\": \"400\"\n}"
        );
        assert_eq!(
            LookupOutcome::NotFound { key: "k".to_string(), tag: None }.to_string(),
            "key:[k] not found"
        );
        assert_eq!(
            LookupOutcome::NotFound {
                key: "k".to_string(),
                tag: Some("ISO".to_string())
            }
            .to_string(),
            "key:[k] with tag:[ISO] not found"
        );
        assert!(LookupOutcome::Usage.to_string().starts_with("Usage:"));
    }

    #[tokio::test]
    async fn test_lookup_record_and_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exif.db");
        seeded_db(&path).await;

        let all = run_lookup(&path, &LookupRequest::KeyOnly(HASH.to_string()))
            .await
            .unwrap();
        assert_eq!(all, LookupOutcome::Record(sample()));

        let iso = run_lookup(
            &path,
            &LookupRequest::KeyAndTag(HASH.to_string(), "ISO".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(iso, LookupOutcome::Field("400".to_string()));
    }

    #[tokio::test]
    async fn test_lookup_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exif.db");
        seeded_db(&path).await;

        let missing = run_lookup(&path, &LookupRequest::KeyOnly("nope".to_string()))
            .await
            .unwrap();
        assert_eq!(
            missing,
            LookupOutcome::NotFound { key: "nope".to_string(), tag: None }
        );

        let missing_tag = run_lookup(
            &path,
            &LookupRequest::KeyAndTag(HASH.to_string(), "LensModel".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(missing_tag.to_string(), format!("key:[{}] with tag:[LensModel] not found", HASH));
    }

    #[tokio::test]
    async fn test_missing_database_is_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typo.db");

        let result = run_lookup(&path, &LookupRequest::KeyOnly("x".to_string())).await;

        assert!(matches!(
            result,
            Err(Error::Database(DatabaseError::ConnectionFailed(_)))
        ));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_no_args_does_not_open_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never.db");

        let outcome = run_lookup(&path, &LookupRequest::NoArgs).await.unwrap();

        assert_eq!(outcome, LookupOutcome::Usage);
        assert!(!path.exists());
    }
}
