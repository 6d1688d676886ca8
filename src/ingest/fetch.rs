//! Blob download: status and content-type gates, streaming to disk.

use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use tokio::io::AsyncWriteExt;

use crate::types::FailureReason;
use crate::utils::blob_url;

use super::task::ItemTaskContext;

/// The only media type whose bodies are handed to extraction
pub const JPEG_MEDIA_TYPE: &str = "image/jpeg";

impl ItemTaskContext {
    /// Download the item's blob to its local path
    ///
    /// The body is written even when a gate fails so the next run can
    /// re-evaluate what is on disk; the gate failure is reported after the
    /// stream ends.
    pub(super) async fn fetch_blob(&self) -> Result<(), FailureReason> {
        let descriptor = self.descriptor();
        let url = blob_url(self.config.source.blob_base_url(), &descriptor.name)
            .map_err(|e| FailureReason::Transport(e.to_string()))?;

        tracing::info!(
            name = %descriptor.name,
            size = descriptor.expected_size,
            "Pulling down image"
        );

        let response = self.http.get(url.clone()).send().await.map_err(|e| {
            tracing::warn!(url = %url, error = %e, "Request failed");
            FailureReason::Transport(e.to_string())
        })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let status_ok = status == StatusCode::OK;
        if !status_ok {
            tracing::warn!(
                url = %url,
                status = status.as_u16(),
                content_type = content_type.as_deref().unwrap_or(""),
                "Unexpected status code"
            );
        }

        let type_ok = content_type.as_deref() == Some(JPEG_MEDIA_TYPE);
        if !type_ok {
            tracing::warn!(
                url = %url,
                content_type = content_type.as_deref().unwrap_or(""),
                "Unexpected content type"
            );
        }

        let written = self.stream_to_disk(response).await?;

        if !status_ok {
            return Err(FailureReason::HttpStatus(status.as_u16()));
        }
        if !type_ok {
            return Err(FailureReason::ContentType(content_type));
        }

        if written != descriptor.expected_size {
            tracing::warn!(
                name = %descriptor.name,
                expected = descriptor.expected_size,
                written,
                "Downloaded size differs from catalog"
            );
        }

        Ok(())
    }

    /// Stream the response body into the item's path, truncating any previous copy
    async fn stream_to_disk(&self, mut response: reqwest::Response) -> Result<u64, FailureReason> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FailureReason::Storage(e.to_string()))?;
        }

        let mut file = tokio::fs::File::create(&self.path)
            .await
            .map_err(|e| FailureReason::Storage(e.to_string()))?;

        let mut written: u64 = 0;
        loop {
            let chunk = match response.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        written,
                        error = %e,
                        "Body stream interrupted"
                    );
                    // Keep what arrived; the size check on the next run decides
                    let _ = file.flush().await;
                    return Err(FailureReason::Transport(e.to_string()));
                }
            };
            file.write_all(&chunk)
                .await
                .map_err(|e| FailureReason::Storage(e.to_string()))?;
            written += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| FailureReason::Storage(e.to_string()))?;

        tracing::debug!(path = %self.path.display(), written, "Wrote blob");
        Ok(written)
    }
}
