//! Utility functions for path and URL handling

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Whether `name` is a non-empty relative path made only of normal components
///
/// Catalog keys become file names under the image directory, so keys with `..`,
/// a root, or a drive prefix are refused.
///
/// # Examples
///
/// ```
/// use exif_harvest::utils::is_safe_relative_name;
///
/// assert!(is_safe_relative_name("a.jpg"));
/// assert!(is_safe_relative_name("2016/11/a.jpg"));
/// assert!(!is_safe_relative_name("../a.jpg"));
/// assert!(!is_safe_relative_name("/a.jpg"));
/// ```
pub fn is_safe_relative_name(name: &str) -> bool {
    let path = Path::new(name);
    !name.is_empty() && path.components().all(|c| matches!(c, Component::Normal(_)))
}

/// Local path of a blob under the image directory
pub fn blob_path(image_dir: &Path, name: &str) -> PathBuf {
    image_dir.join(name)
}

/// Build the URL of an object by appending `name` to `base` as path segments
///
/// Each `/`-separated part of the name is percent-encoded on its own.
///
/// # Examples
///
/// ```
/// use exif_harvest::utils::blob_url;
///
/// let url = blob_url("https://s3.amazonaws.com/bucket", "dir/my photo.jpg").unwrap();
/// assert_eq!(url.as_str(), "https://s3.amazonaws.com/bucket/dir/my%20photo.jpg");
/// ```
pub fn blob_url(base: &str, name: &str) -> Result<url::Url> {
    let mut url = url::Url::parse(base)
        .map_err(|e| Error::config("blob_base_url", format!("invalid URL '{}': {}", base, e)))?;

    {
        let mut segments = url.path_segments_mut().map_err(|_| {
            Error::config("blob_base_url", format!("'{}' cannot be a base URL", base))
        })?;
        segments.pop_if_empty();
        for part in name.split('/') {
            segments.push(part);
        }
    }

    Ok(url)
}
