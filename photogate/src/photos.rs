//! Upstream photo listing. The payload is passed through untouched apart from
//! checking that it is a JSON array.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

#[async_trait]
pub trait PhotoSource: Send + Sync + 'static {
    /// Fetch the full listing as a serialized JSON array.
    async fn fetch(&self) -> Result<String, PhotoSourceError>;
}

#[derive(Debug, Clone)]
pub struct HttpPhotoSource {
    client: reqwest::Client,
    url: String,
}

impl HttpPhotoSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("photogate/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_default()
}

#[async_trait]
impl PhotoSource for HttpPhotoSource {
    async fn fetch(&self) -> Result<String, PhotoSourceError> {
        let resp = self.client.get(&self.url).send().await.map_err(|e| {
            warn!(url = %self.url, error = %e, "photo api: connection failed");
            PhotoSourceError::Http(e)
        })?;
        let status = resp.status();
        if !status.is_success() {
            warn!(url = %self.url, status = %status, "photo api: HTTP error");
            return Err(PhotoSourceError::Status(status.as_u16()));
        }
        let body = resp.text().await?;
        let photos = validate_photo_array(&body)?;
        debug!(url = %self.url, photos = photos, "photo api: listing fetched");
        Ok(body)
    }
}

/// Checks that `raw` is a JSON array and returns its length.
pub fn validate_photo_array(raw: &str) -> Result<usize, PhotoSourceError> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Array(items) => Ok(items.len()),
        _ => Err(PhotoSourceError::NotAnArray),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PhotoSourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned status {0}")]
    Status(u16),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("photo listing is not a JSON array")]
    NotAnArray,
}
