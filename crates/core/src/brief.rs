//! Ad brief data contract and validation.
//!
//! The brief is generated by the text model from the approved analyses,
//! edited by a reviewer at the prompt checkpoint, and finally turned into a
//! [`VideoPrompt`](crate::video_prompt::VideoPrompt).

use serde::{Deserialize, Serialize};

use crate::analysis::{is_valid_hex_color, StyleAnalysis, UspAnalysis, ANALYSIS_VERSION};
use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum number of scenes in a script.
pub const MAX_SCENES: usize = 8;

/// Maximum duration of a single scene in seconds.
pub const MAX_SCENE_DURATION_SECS: u32 = 10;

/// Maximum total script duration in seconds.
pub const MAX_TOTAL_DURATION_SECS: u32 = 60;

/// Default CTA label used by the fallback brief.
pub const DEFAULT_CTA_TEXT: &str = "Learn More";

/// Default CTA target used by the fallback brief.
pub const DEFAULT_CTA_URL: &str = "https://example.com/product";

/// Tone used when neither the brief nor the analysis provides one.
pub const DEFAULT_TONE: &str = "Professional";

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BriefMetadata {
    pub version: String,
    pub created_at: Option<Timestamp>,
    pub approved_by: Option<String>,
}

impl Default for BriefMetadata {
    fn default() -> Self {
        Self {
            version: ANALYSIS_VERSION.to_string(),
            created_at: None,
            approved_by: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToAction {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreativeConcept {
    pub hook: String,
    pub core_message: String,
    pub call_to_action: CallToAction,
}

/// One scene of the script. Keeps the snake_case `duration_seconds` key the
/// brief format has always used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub scene: u32,
    pub duration_seconds: u32,
    pub visuals: String,
    #[serde(default)]
    pub voiceover: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleGuidance {
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub dominant_colors: Vec<String>,
    #[serde(default)]
    pub font_style: String,
}

impl StyleGuidance {
    pub fn is_empty(&self) -> bool {
        self.tone.is_empty() && self.dominant_colors.is_empty() && self.font_style.is_empty()
    }
}

impl From<&StyleAnalysis> for StyleGuidance {
    fn from(style: &StyleAnalysis) -> Self {
        Self {
            tone: style.tone_of_voice.clone(),
            dominant_colors: style.hex_codes(),
            font_style: style.font_style.clone(),
        }
    }
}

/// A complete ad brief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdBrief {
    #[serde(default)]
    pub campaign_id: String,
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub metadata: BriefMetadata,
    pub creative_concept: CreativeConcept,
    pub script: Vec<Scene>,
    #[serde(default)]
    pub style_guidance: StyleGuidance,
}

impl AdBrief {
    /// Sum of all scene durations in seconds.
    pub fn total_duration_secs(&self) -> u32 {
        self.script.iter().map(|s| s.duration_seconds).sum()
    }

    /// Build a minimal brief straight from the analyses. Used when the model
    /// does not return a parseable brief.
    pub fn fallback(
        usp: &UspAnalysis,
        style: &StyleAnalysis,
        campaign_id: &str,
        product_id: &str,
    ) -> Self {
        let hook = usp
            .usps
            .first()
            .cloned()
            .unwrap_or_else(|| "Discover something new".to_string());
        let core_message = if usp.emotions.is_empty() {
            usp.usps.join(". ")
        } else {
            format!("Feel the {}", usp.emotions.join(", "))
        };
        let mut style_guidance = StyleGuidance::from(style);
        if style_guidance.tone.is_empty() {
            style_guidance.tone = DEFAULT_TONE.to_string();
        }
        if style_guidance.dominant_colors.is_empty() {
            style_guidance.dominant_colors = vec!["#FFFFFF".to_string(), "#000000".to_string()];
        }

        Self {
            campaign_id: campaign_id.to_string(),
            product_id: product_id.to_string(),
            metadata: BriefMetadata::default(),
            creative_concept: CreativeConcept {
                hook: hook.clone(),
                core_message: if core_message.is_empty() {
                    hook.clone()
                } else {
                    core_message
                },
                call_to_action: CallToAction {
                    text: DEFAULT_CTA_TEXT.to_string(),
                    url: DEFAULT_CTA_URL.to_string(),
                },
            },
            script: vec![Scene {
                scene: 1,
                duration_seconds: 5,
                visuals: format!("Product showcase highlighting: {hook}"),
                voiceover: hook,
            }],
            style_guidance,
        }
    }

    /// Validate the brief against the format rules.
    pub fn validate(&self) -> Result<(), CoreError> {
        let concept = &self.creative_concept;
        if concept.hook.trim().is_empty() {
            return Err(CoreError::Validation("Brief hook must not be empty".into()));
        }
        if concept.core_message.trim().is_empty() {
            return Err(CoreError::Validation(
                "Brief core message must not be empty".into(),
            ));
        }
        if concept.call_to_action.text.trim().is_empty() {
            return Err(CoreError::Validation(
                "Call to action text must not be empty".into(),
            ));
        }
        let url = concept.call_to_action.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CoreError::Validation(format!(
                "Call to action URL must be http(s), got '{url}'"
            )));
        }

        if self.script.is_empty() {
            return Err(CoreError::Validation(
                "Script must contain at least one scene".into(),
            ));
        }
        if self.script.len() > MAX_SCENES {
            return Err(CoreError::Validation(format!(
                "Script may contain at most {MAX_SCENES} scenes (got {})",
                self.script.len()
            )));
        }
        for (idx, scene) in self.script.iter().enumerate() {
            let expected = idx as u32 + 1;
            if scene.scene != expected {
                return Err(CoreError::Validation(format!(
                    "Scenes must be numbered sequentially from 1: expected {expected}, got {}",
                    scene.scene
                )));
            }
            if scene.duration_seconds == 0 || scene.duration_seconds > MAX_SCENE_DURATION_SECS {
                return Err(CoreError::Validation(format!(
                    "Scene {} duration must be between 1 and {MAX_SCENE_DURATION_SECS} seconds",
                    scene.scene
                )));
            }
            if scene.visuals.trim().is_empty() {
                return Err(CoreError::Validation(format!(
                    "Scene {} visuals must not be empty",
                    scene.scene
                )));
            }
        }
        let total = self.total_duration_secs();
        if total > MAX_TOTAL_DURATION_SECS {
            return Err(CoreError::Validation(format!(
                "Total script duration {total}s exceeds {MAX_TOTAL_DURATION_SECS}s"
            )));
        }

        if let Some(bad) = self
            .style_guidance
            .dominant_colors
            .iter()
            .find(|c| !is_valid_hex_color(c))
        {
            return Err(CoreError::Validation(format!(
                "Invalid hex color '{bad}' in style guidance"
            )));
        }
        Ok(())
    }
}

/// Generate an identifier of the form `{prefix}-xxxxxx`.
pub fn generate_short_id(prefix: &str) -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &hex[..6])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
