//! Vertex AI REST client.
//!
//! Text and vision prompts go through `:generateContent`; video goes
//! through `:predictLongRunning` and is polled with
//! `:fetchPredictOperation`.

use adapt_core::video_prompt::VideoPrompt;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;

use crate::error::GenAiError;
use crate::http::parse_response;
use crate::model::{TextModel, VideoModel};
use crate::types::{GenerateRequest, GeneratedVideo, OperationStatus, Part, VideoOperation};

/// HTTP client for one Vertex AI project and location.
pub struct VertexClient {
    client: reqwest::Client,
    base_url: String,
    project: String,
    location: String,
    access_token: String,
    video_model: String,
}

// ---- wire types ----

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OperationResponse {
    name: String,
    #[serde(default)]
    done: bool,
    response: Option<PredictResult>,
    error: Option<OperationError>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PredictResult {
    #[serde(default)]
    videos: Vec<VideoPayload>,
    #[serde(rename = "raiMediaFilteredReasons", default)]
    filtered_reasons: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct VideoPayload {
    #[serde(rename = "gcsUri")]
    gcs_uri: Option<String>,
    #[serde(rename = "bytesBase64Encoded")]
    bytes_base64: Option<String>,
}

impl VertexClient {
    /// Create a client. `base_url` overrides the regional endpoint
    /// (`https://{location}-aiplatform.googleapis.com`) when set.
    pub fn new(
        client: reqwest::Client,
        project: String,
        location: String,
        access_token: String,
        video_model: String,
        base_url: Option<String>,
    ) -> Self {
        let base_url = base_url.unwrap_or_else(|| {
            if location == "global" {
                "https://aiplatform.googleapis.com".to_string()
            } else {
                format!("https://{location}-aiplatform.googleapis.com")
            }
        });
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            project,
            location,
            access_token,
            video_model,
        }
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{model}:{method}",
            self.base_url, self.project, self.location
        )
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        body: &serde_json::Value,
    ) -> Result<T, GenAiError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;
        parse_response(response).await
    }
}

/// Build the `generateContent` body for a request.
pub fn generate_content_body(request: &GenerateRequest) -> serde_json::Value {
    let parts: Vec<serde_json::Value> = request
        .parts
        .iter()
        .map(|part| match part {
            Part::Text(text) => json!({ "text": text }),
            Part::InlineData { mime_type, data } => json!({
                "inlineData": { "mimeType": mime_type, "data": BASE64.encode(data) }
            }),
        })
        .collect();

    let mut body = json!({ "contents": [{ "role": "user", "parts": parts }] });
    if request.json_response {
        body["generationConfig"] = json!({ "responseMimeType": "application/json" });
    }
    body
}

/// Build the `predictLongRunning` body for a video prompt.
pub fn predict_video_body(prompt: &VideoPrompt) -> serde_json::Value {
    json!({
        "instances": [{ "prompt": prompt.prompt }],
        "parameters": {
            "aspectRatio": prompt.aspect_ratio,
            "durationSeconds": prompt.duration_seconds,
            "enhancePrompt": prompt.enhance_prompt,
            "generateAudio": prompt.generate_audio,
            "negativePrompt": prompt.negative_prompt,
            "resolution": prompt.resolution,
            "sampleCount": 1,
        }
    })
}

fn operation_status(op: OperationResponse) -> Result<OperationStatus, GenAiError> {
    if !op.done {
        return Ok(OperationStatus::Running);
    }
    if let Some(error) = op.error {
        return Ok(OperationStatus::Failed(error.message));
    }
    let result = op
        .response
        .ok_or_else(|| GenAiError::Parse(format!("operation {} finished without a response", op.name)))?;

    let mut videos = Vec::with_capacity(result.videos.len());
    for video in result.videos {
        if let Some(encoded) = video.bytes_base64 {
            let bytes = BASE64
                .decode(encoded)
                .map_err(|e| GenAiError::Parse(format!("invalid base64 video payload: {e}")))?;
            videos.push(GeneratedVideo::Bytes(bytes));
        } else if let Some(uri) = video.gcs_uri {
            videos.push(GeneratedVideo::Uri(uri));
        }
    }

    if videos.is_empty() {
        let reason = if result.filtered_reasons.is_empty() {
            "operation returned no videos".to_string()
        } else {
            result.filtered_reasons.join("; ")
        };
        return Ok(OperationStatus::Failed(reason));
    }
    Ok(OperationStatus::Succeeded(videos))
}

#[async_trait]
impl TextModel for VertexClient {
    async fn generate(&self, request: GenerateRequest) -> Result<String, GenAiError> {
        let url = self.model_url(&request.model, "generateContent");
        let body = generate_content_body(&request);
        tracing::debug!(model = %request.model, parts = request.parts.len(), "Calling generateContent");

        let response: GenerateContentResponse = self.post_json(url, &body).await?;
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| GenAiError::Parse("response contained no candidates".into()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(GenAiError::Parse(format!(
                "candidate contained no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }
        Ok(text)
    }
}

#[async_trait]
impl VideoModel for VertexClient {
    async fn start(&self, prompt: &VideoPrompt) -> Result<VideoOperation, GenAiError> {
        let url = self.model_url(&self.video_model, "predictLongRunning");
        let op: OperationResponse = self.post_json(url, &predict_video_body(prompt)).await?;
        tracing::info!(operation = %op.name, model = %self.video_model, "Video generation started");
        Ok(VideoOperation { name: op.name })
    }

    async fn poll(&self, operation: &VideoOperation) -> Result<OperationStatus, GenAiError> {
        let url = self.model_url(&self.video_model, "fetchPredictOperation");
        let op: OperationResponse = self
            .post_json(url, &json!({ "operationName": operation.name }))
            .await?;
        operation_status(op)
    }
}
