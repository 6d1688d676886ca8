//! Configuration types for exif-harvest

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming a JSON configuration file
pub const CONFIG_ENV_VAR: &str = "EXIF_HARVEST_CONFIG";

/// Where the catalog and its objects are fetched from
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceConfig {
    /// URL of the catalog listing (default: the public waldo-recruiting bucket)
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,

    /// Base URL that object names are appended to (default: same as `catalog_url`)
    #[serde(default)]
    pub blob_base_url: Option<String>,

    /// Deadline for each HTTP request, including reading the body (default: 60 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            catalog_url: default_catalog_url(),
            blob_base_url: None,
            request_timeout: default_request_timeout(),
        }
    }
}

impl SourceConfig {
    /// Base URL for object downloads, falling back to the catalog URL
    pub fn blob_base_url(&self) -> &str {
        self.blob_base_url.as_deref().unwrap_or(&self.catalog_url)
    }
}

/// Local blob cache and worker pool settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Directory holding downloaded images (default: "./images")
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,

    /// Maximum number of items fetched/extracted/stored at once (default: 10)
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            image_dir: default_image_dir(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

/// Metadata store location
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// SQLite database path (default: "./exif.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Main configuration
///
/// Every field has a default, so an empty JSON object is a valid configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Catalog and object source
    #[serde(default)]
    pub source: SourceConfig,

    /// Local blob cache and concurrency
    #[serde(default)]
    pub download: DownloadConfig,

    /// Metadata store
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl Config {
    /// Load a configuration from a JSON file and validate it
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read '{}': {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, then from [`CONFIG_ENV_VAR`], then fall back to defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.download.max_concurrent == 0 {
            return Err(Error::config("max_concurrent", "must be at least 1"));
        }
        url::Url::parse(&self.source.catalog_url)
            .map_err(|e| Error::config("catalog_url", format!("invalid URL: {}", e)))?;
        url::Url::parse(self.source.blob_base_url())
            .map_err(|e| Error::config("blob_base_url", format!("invalid URL: {}", e)))?;
        Ok(())
    }

    /// Directory holding downloaded images
    pub fn image_dir(&self) -> &PathBuf {
        &self.download.image_dir
    }
}

fn default_catalog_url() -> String {
    "https://s3.amazonaws.com/waldo-recruiting".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_image_dir() -> PathBuf {
    PathBuf::from("images")
}

fn default_max_concurrent() -> usize {
    10
}

fn default_database_path() -> PathBuf {
    PathBuf::from("exif.db")
}

// Duration serialization helper (as whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(
            config.source.catalog_url,
            "https://s3.amazonaws.com/waldo-recruiting"
        );
        assert_eq!(config.source.blob_base_url(), config.source.catalog_url);
        assert_eq!(config.download.image_dir, PathBuf::from("images"));
        assert_eq!(config.download.max_concurrent, 10);
        assert_eq!(config.source.request_timeout, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let config: Config = serde_json::from_str(
            r#"{
                "source": { "blob_base_url": "http://localhost:9000/bucket", "request_timeout": 5 },
                "download": { "max_concurrent": 4 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.source.blob_base_url(), "http://localhost:9000/bucket");
        assert_eq!(config.source.request_timeout, Duration::from_secs(5));
        assert_eq!(config.download.max_concurrent, 4);
        assert_eq!(config.persistence.database_path, PathBuf::from("exif.db"));
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let mut config = Config::default();
        config.download.max_concurrent = 0;

        match config.validate() {
            Err(Error::Config { key, .. }) => assert_eq!(key.as_deref(), Some("max_concurrent")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_catalog_url_is_rejected() {
        let mut config = Config::default();
        config.source.catalog_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "persistence": { "database_path": "/tmp/x.db" } }"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.persistence.database_path, PathBuf::from("/tmp/x.db"));

        let missing = Config::from_file(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(Error::Config { .. })));
    }
}
