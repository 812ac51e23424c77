//! Client for a job-queue style video generation API.
//!
//! `POST {endpoint}` with the video prompt returns `{"jobId": ...}`;
//! `GET {endpoint}/{jobId}` returns `{"status": ..., "outputUrl": ...}`
//! where status `SUCCEEDED` and `FAILED` are final and anything else means
//! the job is still running.

use adapt_core::video_prompt::VideoPrompt;
use async_trait::async_trait;
use serde::Deserialize;

use crate::error::GenAiError;
use crate::http::parse_response;
use crate::model::VideoModel;
use crate::types::{GeneratedVideo, OperationStatus, VideoOperation};

pub const STATUS_SUCCEEDED: &str = "SUCCEEDED";
pub const STATUS_FAILED: &str = "FAILED";

pub struct VideoJobsClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartResponse {
    job_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    #[serde(default)]
    status: String,
    output_url: Option<String>,
    error: Option<String>,
}

impl VideoJobsClient {
    pub fn new(client: reqwest::Client, endpoint: String, api_key: String) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl VideoModel for VideoJobsClient {
    async fn start(&self, prompt: &VideoPrompt) -> Result<VideoOperation, GenAiError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(prompt)
            .send()
            .await?;
        let body: StartResponse = parse_response(response).await?;
        let job_id = body
            .job_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| GenAiError::Parse("API did not return a job ID".into()))?;
        tracing::info!(job_id = %job_id, "Video job started");
        Ok(VideoOperation { name: job_id })
    }

    async fn poll(&self, operation: &VideoOperation) -> Result<OperationStatus, GenAiError> {
        let response = self
            .client
            .get(format!("{}/{}", self.endpoint, operation.name))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let body: StatusResponse = parse_response(response).await?;
        tracing::debug!(job_id = %operation.name, status = %body.status, "Video job status");

        Ok(match body.status.as_str() {
            STATUS_SUCCEEDED => match body.output_url {
                Some(url) if !url.is_empty() => {
                    OperationStatus::Succeeded(vec![GeneratedVideo::Uri(url)])
                }
                _ => OperationStatus::Failed(format!(
                    "Video generation job {} succeeded without an output URL",
                    operation.name
                )),
            },
            STATUS_FAILED => OperationStatus::Failed(body.error.unwrap_or_else(|| {
                format!("Video generation job {} failed", operation.name)
            })),
            _ => OperationStatus::Running,
        })
    }
}
