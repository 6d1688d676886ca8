use crate::db::*;
use crate::store::MetadataStore;
use tempfile::NamedTempFile;

/// Verify that querying the database after closing the pool returns an error
/// rather than hanging or panicking.
#[tokio::test]
async fn test_exists_after_pool_close_returns_error() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    db.set_metadata_fields("i:abc", &["ISO".to_string(), "100".to_string()])
        .await
        .unwrap();
    assert!(db.key_exists("i:abc").await.unwrap());

    db.close().await;

    let result = db.key_exists("i:abc").await;
    assert!(
        result.is_err(),
        "key_exists after pool close should return an error, got: {:?}",
        result
    );
}

/// Verify that writing after closing the pool returns an error
#[tokio::test]
async fn test_set_fields_after_pool_close_returns_error() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    db.close().await;

    let result = db
        .set_metadata_fields("i:abc", &["ISO".to_string(), "100".to_string()])
        .await;
    assert!(
        result.is_err(),
        "set_metadata_fields after pool close should return an error, got: {:?}",
        result
    );
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    assert!(!db.is_closed());
    MetadataStore::close(&db).await;
    MetadataStore::close(&db).await;
    assert!(db.is_closed());
}
