//! Test configuration helpers

use std::path::{Path, PathBuf};
use std::time::Duration;

use exif_harvest::Config;
use exif_harvest::config::{DownloadConfig, PersistenceConfig, SourceConfig};

/// Configuration reading from `server_uri` with all local state under `dir`
pub fn create_test_config(server_uri: &str, dir: &Path) -> Config {
    Config {
        source: SourceConfig {
            catalog_url: format!("{}/catalog", server_uri),
            blob_base_url: Some(format!("{}/blobs", server_uri)),
            request_timeout: Duration::from_secs(5),
        },
        download: DownloadConfig {
            image_dir: dir.join("images"),
            max_concurrent: 4,
        },
        persistence: PersistenceConfig {
            database_path: dir.join("exif.db"),
        },
    }
}

/// Write `config` as JSON next to its database and return the file path
pub fn write_config_file(config: &Config, dir: &Path) -> PathBuf {
    let path = dir.join("exif-harvest.json");
    let json = serde_json::to_string_pretty(config).unwrap();
    std::fs::write(&path, json).unwrap();
    path
}
