//! Ad brief generation from the approved analyses.

use adapt_core::analysis::{is_valid_hex_color, StyleAnalysis, UspAnalysis, ANALYSIS_VERSION};
use adapt_core::brief::{AdBrief, StyleGuidance};
use adapt_core::model_output::parse_model_json;
use adapt_genai::{GenerateRequest, Part};
use chrono::Utc;

use crate::context::PipelineContext;
use crate::error::PipelineError;
use crate::prompts::brief_prompt;

pub async fn generate_brief(
    ctx: &PipelineContext,
    usp: &UspAnalysis,
    style: &StyleAnalysis,
    campaign_id: &str,
    product_id: &str,
) -> Result<AdBrief, PipelineError> {
    let request = GenerateRequest::new(
        ctx.config.text_model.as_str(),
        vec![Part::text(brief_prompt(usp, style, campaign_id, product_id))],
    )
    .json();
    let raw = ctx.text_model.generate(request).await?;

    let parsed = parse_model_json::<AdBrief>(&raw)
        .map_err(|e| e.to_string())
        .and_then(|brief| finish(brief, style, campaign_id, product_id));

    let brief = match parsed {
        Ok(brief) => brief,
        Err(reason) => {
            tracing::warn!(%reason, campaign_id, "Brief response unusable, using fallback");
            let mut brief = AdBrief::fallback(usp, style, campaign_id, product_id);
            brief.metadata.created_at = Some(Utc::now());
            brief
        }
    };
    Ok(brief)
}

/// Stamp ids and metadata, fill missing style guidance, and validate.
fn finish(
    mut brief: AdBrief,
    style: &StyleAnalysis,
    campaign_id: &str,
    product_id: &str,
) -> Result<AdBrief, String> {
    brief.campaign_id = campaign_id.to_string();
    brief.product_id = product_id.to_string();
    brief.metadata.version = ANALYSIS_VERSION.to_string();
    brief.metadata.created_at = Some(Utc::now());
    brief.metadata.approved_by = None;

    // Models sometimes echo the schema placeholders instead of hex codes.
    let guidance = &mut brief.style_guidance;
    guidance.dominant_colors.retain(|c| is_valid_hex_color(c));
    if guidance.is_empty() {
        *guidance = StyleGuidance::from(style);
    }
    if guidance.tone.trim().is_empty() {
        guidance.tone = style.tone_of_voice.clone();
    }
    if guidance.font_style.trim().is_empty() {
        guidance.font_style = style.font_style.clone();
    }
    if guidance.dominant_colors.is_empty() {
        guidance.dominant_colors = style.hex_codes();
    }

    brief.validate().map_err(|e| e.to_string())?;
    Ok(brief)
}
