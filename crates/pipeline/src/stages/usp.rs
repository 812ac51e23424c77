//! USP and emotional-trigger extraction.

use adapt_core::analysis::UspAnalysis;
use adapt_core::model_output::parse_model_json;
use adapt_genai::{GenerateRequest, Part};

use crate::context::PipelineContext;
use crate::error::PipelineError;
use crate::prompts::usp_prompt;
use crate::stages::ingestion::ProductInput;

pub async fn extract_usps(
    ctx: &PipelineContext,
    input: &ProductInput,
) -> Result<UspAnalysis, PipelineError> {
    let product_text = input.combined_text();
    if product_text.is_empty() {
        return Err(PipelineError::InvalidInput(
            "Product input must contain a description, landing page or creative title".into(),
        ));
    }

    let request = GenerateRequest::new(
        ctx.config.text_model.as_str(),
        vec![Part::text(usp_prompt(&product_text))],
    )
    .json();
    let raw = ctx.text_model.generate(request).await?;

    let analysis = parse_model_json::<UspAnalysis>(&raw).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "USP response was not valid JSON, using fallback");
        UspAnalysis::fallback(&raw)
    });
    Ok(analysis.normalized())
}
