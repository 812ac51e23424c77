//! Shared handles every stage needs.

use std::sync::Arc;

use adapt_cloud::{ObjectStore, ObjectUri};
use adapt_genai::{TextModel, VideoModel};

use crate::config::PipelineConfig;
use crate::error::PipelineError;

pub struct PipelineContext {
    pub store: Arc<dyn ObjectStore>,
    pub text_model: Arc<dyn TextModel>,
    pub video_model: Arc<dyn VideoModel>,
    /// Client for landing pages and HTTP-hosted media.
    pub http: reqwest::Client,
    pub config: PipelineConfig,
}

impl PipelineContext {
    /// Read bytes from object storage (`gs://`, `s3://`, `file://`) or over
    /// HTTP(S).
    pub async fn fetch_bytes(&self, location: &str) -> Result<Vec<u8>, PipelineError> {
        if ObjectUri::is_object_uri(location) {
            return Ok(self.store.get(location).await?);
        }
        if !(location.starts_with("http://") || location.starts_with("https://")) {
            return Err(PipelineError::InvalidInput(format!(
                "Unsupported location '{location}'"
            )));
        }
        self.download(location).await
    }

    /// Fetch a page as text. Invalid UTF-8 is replaced rather than rejected.
    pub async fn fetch_text(&self, url: &str) -> Result<String, PipelineError> {
        let body = self.download(url).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// GET `url`, refusing bodies over `max_fetch_bytes`.
    async fn download(&self, url: &str) -> Result<Vec<u8>, PipelineError> {
        let limit = self.config.max_fetch_bytes;
        let too_large = || {
            PipelineError::InvalidInput(format!("'{url}' is larger than {limit} bytes"))
        };

        let mut response = self.http.get(url).send().await?.error_for_status()?;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(too_large());
        }
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > limit {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}
