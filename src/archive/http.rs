//! Archive that PUTs objects to an S3-compatible HTTP endpoint.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use super::Archive;
use crate::error::StorageError;

// ---

#[derive(Debug, Clone)]
pub struct HttpArchive {
    client: reqwest::Client,
    bucket_url: String,
}

impl HttpArchive {
    pub fn new(endpoint: &str, bucket: &str) -> Self {
        HttpArchive {
            client: reqwest::Client::new(),
            bucket_url: format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
        }
    }

    /// URL of `key` under the bucket. Keys with empty or dot segments are
    /// refused, since URL normalization would resolve them outside the object path.
    fn object_url(&self, key: &str) -> Result<String, StorageError> {
        // ---
        let segments: Vec<&str> = key.split('/').collect();
        if segments.iter().any(|s| matches!(*s, "" | "." | "..")) {
            return Err(StorageError::Archive {
                key: key.to_string(),
                reason: "key is not a relative object path".into(),
            });
        }
        let encoded: Vec<_> = segments.into_iter().map(urlencoding::encode).collect();
        Ok(format!("{}/{}", self.bucket_url, encoded.join("/")))
    }
}

#[async_trait]
impl Archive for HttpArchive {
    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), StorageError> {
        // ---
        let url = self.object_url(key)?;
        let archive_err = |reason: String| StorageError::Archive {
            key: key.to_string(),
            reason,
        };

        let response = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| archive_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(archive_err(format!("PUT {} returned {}", url, status)));
        }

        tracing::debug!("Archived {} ({})", key, status);
        Ok(())
    }
}
