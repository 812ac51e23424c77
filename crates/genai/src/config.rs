//! Model client configuration loaded from the environment.

use std::sync::Arc;
use std::time::Duration;

use crate::error::GenAiError;
use crate::model::{TextModel, VideoModel};
use crate::vertex::VertexClient;
use crate::video_jobs::VideoJobsClient;

/// Default text and vision model.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-pro";

/// Default video model.
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.0-generate-001";

/// Timeout applied to every model HTTP request.
const HTTP_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoBackend {
    /// Vertex AI long-running prediction.
    Vertex,
    /// Generic job API at `VIDEO_JOBS_ENDPOINT`.
    Jobs { endpoint: String, api_key: String },
}

#[derive(Debug, Clone)]
pub struct GenAiConfig {
    pub project: String,
    pub location: String,
    pub access_token: String,
    pub text_model: String,
    pub video_model: String,
    pub base_url: Option<String>,
    pub video_backend: VideoBackend,
}

impl GenAiConfig {
    /// Load model configuration from environment variables.
    ///
    /// | Env Var               | Default                |
    /// |-----------------------|------------------------|
    /// | `GCP_PROJECT`         | (required)             |
    /// | `GCP_LOCATION`        | `us-central1`          |
    /// | `VERTEX_ACCESS_TOKEN` | (required)             |
    /// | `VERTEX_BASE_URL`     | regional endpoint      |
    /// | `TEXT_MODEL`          | `gemini-2.5-pro`       |
    /// | `VIDEO_MODEL`         | `veo-3.0-generate-001` |
    /// | `VIDEO_BACKEND`       | `vertex` (or `jobs`)   |
    /// | `VIDEO_JOBS_ENDPOINT` | required for `jobs`    |
    /// | `VIDEO_JOBS_API_KEY`  | required for `jobs`    |
    pub fn from_env() -> Result<Self, GenAiError> {
        let required = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| GenAiError::Config(format!("{name} must be set")))
        };

        let video_backend = match std::env::var("VIDEO_BACKEND")
            .unwrap_or_else(|_| "vertex".into())
            .as_str()
        {
            "vertex" => VideoBackend::Vertex,
            "jobs" => VideoBackend::Jobs {
                endpoint: required("VIDEO_JOBS_ENDPOINT")?,
                api_key: required("VIDEO_JOBS_API_KEY")?,
            },
            other => {
                return Err(GenAiError::Config(format!(
                    "Unknown VIDEO_BACKEND '{other}'. Must be one of: vertex, jobs"
                )))
            }
        };

        Ok(Self {
            project: required("GCP_PROJECT")?,
            location: std::env::var("GCP_LOCATION").unwrap_or_else(|_| "us-central1".into()),
            access_token: required("VERTEX_ACCESS_TOKEN")?,
            text_model: std::env::var("TEXT_MODEL").unwrap_or_else(|_| DEFAULT_TEXT_MODEL.into()),
            video_model: std::env::var("VIDEO_MODEL")
                .unwrap_or_else(|_| DEFAULT_VIDEO_MODEL.into()),
            base_url: std::env::var("VERTEX_BASE_URL").ok().filter(|v| !v.is_empty()),
            video_backend,
        })
    }

    /// HTTP client shared by all model clients.
    pub fn http_client() -> Result<reqwest::Client, GenAiError> {
        Ok(reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?)
    }

    /// Build the text and video model clients.
    pub fn build_models(
        &self,
        http: reqwest::Client,
    ) -> (Arc<dyn TextModel>, Arc<dyn VideoModel>) {
        let vertex = Arc::new(VertexClient::new(
            http.clone(),
            self.project.clone(),
            self.location.clone(),
            self.access_token.clone(),
            self.video_model.clone(),
            self.base_url.clone(),
        ));
        let video: Arc<dyn VideoModel> = match &self.video_backend {
            VideoBackend::Vertex => vertex.clone(),
            VideoBackend::Jobs { endpoint, api_key } => Arc::new(VideoJobsClient::new(
                http,
                endpoint.clone(),
                api_key.clone(),
            )),
        };
        (vertex as Arc<dyn TextModel>, video)
    }
}
