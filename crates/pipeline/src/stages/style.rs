//! Brand style analysis over creatives and logos.

use adapt_core::analysis::StyleAnalysis;
use adapt_core::model_output::parse_model_json;
use adapt_genai::{GenerateRequest, Part};

use crate::context::PipelineContext;
use crate::error::PipelineError;
use crate::prompts::STYLE_PROMPT;

pub async fn analyze_brand_style(
    ctx: &PipelineContext,
    image_uris: &[String],
) -> Result<StyleAnalysis, PipelineError> {
    if image_uris.is_empty() {
        return Err(PipelineError::InvalidInput(
            "No image URIs provided for brand style analysis".into(),
        ));
    }

    let mut parts = Vec::with_capacity(image_uris.len() + 1);
    parts.push(Part::text(STYLE_PROMPT));
    for uri in image_uris {
        let data = ctx.fetch_bytes(uri).await?;
        let mime_type = sniff_image_mime(uri, &data)?;
        tracing::debug!(uri = %uri, mime_type, bytes = data.len(), "Loaded brand image");
        parts.push(Part::InlineData {
            mime_type: mime_type.to_string(),
            data,
        });
    }

    let request = GenerateRequest::new(ctx.config.text_model.as_str(), parts).json();
    let raw = ctx.text_model.generate(request).await?;

    let analysis = parse_model_json::<StyleAnalysis>(&raw).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Style response was not valid JSON, using fallback");
        StyleAnalysis::fallback(&raw)
    });
    Ok(analysis.normalized())
}

/// MIME type from the image's magic bytes.
fn sniff_image_mime(uri: &str, data: &[u8]) -> Result<&'static str, PipelineError> {
    image::guess_format(data)
        .map(|format| format.to_mime_type())
        .map_err(|_| PipelineError::InvalidInput(format!("'{uri}' is not a supported image")))
}
