//! Video generation: start the job, wait for it, store the clip.

use adapt_core::artifacts::CONTENT_TYPE_MP4;
use adapt_core::video_prompt::VideoPrompt;
use adapt_genai::{wait_for_video, GenAiError, GeneratedVideo};
use tokio_util::sync::CancellationToken;

use crate::context::PipelineContext;
use crate::error::PipelineError;

/// Render `prompt` and write the first returned clip to `output_uri`.
/// Returns the size of the stored video in bytes.
pub async fn generate_video(
    ctx: &PipelineContext,
    prompt: &VideoPrompt,
    output_uri: &str,
    cancel: &CancellationToken,
) -> Result<usize, PipelineError> {
    prompt.validate()?;

    let operation = ctx.video_model.start(prompt).await?;
    tracing::info!(
        operation = %operation.name,
        duration_seconds = prompt.duration_seconds,
        "Video generation started"
    );

    let videos = wait_for_video(
        ctx.video_model.as_ref(),
        &operation,
        ctx.config.video_poll,
        cancel,
    )
    .await?;

    let bytes = match videos.into_iter().next() {
        Some(GeneratedVideo::Bytes(bytes)) => bytes,
        Some(GeneratedVideo::Uri(uri)) => ctx.fetch_bytes(&uri).await?,
        None => {
            return Err(GenAiError::GenerationFailed("Model returned no videos".into()).into());
        }
    };
    if bytes.is_empty() {
        return Err(GenAiError::GenerationFailed("Model returned an empty video".into()).into());
    }

    let size = bytes.len();
    ctx.store.put(output_uri, bytes, CONTENT_TYPE_MP4).await?;
    tracing::info!(output_uri, size, "Video stored");
    Ok(size)
}
