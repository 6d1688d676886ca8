use crate::db::*;
use crate::store::{MetadataStore, flatten_fields, metadata_key};
use crate::types::MetadataRecord;
use tempfile::NamedTempFile;

fn pairs(entries: &[(&str, &str)]) -> Vec<String> {
    entries
        .iter()
        .flat_map(|(k, v)| [k.to_string(), v.to_string()])
        .collect()
}

#[tokio::test]
async fn test_unknown_key_is_absent() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    assert!(!db.exists("i:missing").await.unwrap());
    assert_eq!(db.get_all("i:missing").await.unwrap(), None);
    assert_eq!(db.get_field("i:missing", "ISO").await.unwrap(), None);

    db.close().await;
}

#[tokio::test]
async fn test_set_and_read_fields() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    let key = metadata_key("04057962cae0c5952196a2eceb6a5715");
    db.set_fields(&key, &pairs(&[("ISO", "400"), ("ApertureValue", "2.625")]))
        .await
        .unwrap();

    assert!(db.exists(&key).await.unwrap());
    assert_eq!(
        db.get_field(&key, "ISO").await.unwrap(),
        Some("400".to_string())
    );
    assert_eq!(db.get_field(&key, "LensModel").await.unwrap(), None);

    let all = db.get_all(&key).await.unwrap().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all.get("ApertureValue").map(String::as_str), Some("2.625"));

    db.close().await;
}

#[tokio::test]
async fn test_rewrite_same_record_is_a_no_op() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    let record: MetadataRecord = [("ISO", "400"), ("Flash", "Flash did not fire")]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let flat = flatten_fields(&record);

    db.set_fields("i:h", &flat).await.unwrap();
    db.set_fields("i:h", &flat).await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM metadata WHERE key = 'i:h'")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(count, 2);
    assert_eq!(db.get_all("i:h").await.unwrap(), Some(record));

    db.close().await;
}

#[tokio::test]
async fn test_set_fields_overwrites_and_keeps_other_fields() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    db.set_fields("i:h", &pairs(&[("ISO", "100"), ("Make", "Canon")]))
        .await
        .unwrap();
    db.set_fields("i:h", &pairs(&[("ISO", "200")])).await.unwrap();

    assert_eq!(db.get_field("i:h", "ISO").await.unwrap().as_deref(), Some("200"));
    assert_eq!(db.get_field("i:h", "Make").await.unwrap().as_deref(), Some("Canon"));

    db.close().await;
}

#[tokio::test]
async fn test_keys_are_isolated() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    db.set_fields("i:a", &pairs(&[("ISO", "100")])).await.unwrap();

    assert!(!db.exists("i:b").await.unwrap());
    assert!(!db.exists("i:").await.unwrap());
    assert_eq!(db.get_field("i:b", "ISO").await.unwrap(), None);

    db.close().await;
}
