//! Video generation prompt: the payload approved at the second checkpoint
//! and sent to the video model.

use serde::{Deserialize, Serialize};

use crate::brief::AdBrief;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Shortest clip the video model accepts, in seconds.
pub const MIN_VIDEO_DURATION_SECS: u32 = 4;

/// Longest clip the video model accepts, in seconds.
pub const MAX_VIDEO_DURATION_SECS: u32 = 8;

pub const DEFAULT_ASPECT_RATIO: &str = "16:9";
pub const DEFAULT_RESOLUTION: &str = "720p";
pub const DEFAULT_NEGATIVE_PROMPT: &str = "wrong spellings";

pub const VALID_ASPECT_RATIOS: &[&str] = &["16:9", "9:16"];
pub const VALID_RESOLUTIONS: &[&str] = &["720p", "1080p"];

/// Maximum length of the full prompt in characters.
pub const MAX_PROMPT_LENGTH: usize = 10_000;

/// Maximum length of the negative prompt in characters.
pub const MAX_NEGATIVE_PROMPT_LENGTH: usize = 1_000;

const DEFAULT_TONE: &str = "modern and energetic";

const STYLE_SUFFIX: &str = "The overall style is cinematic, photorealistic, 4k resolution, \
with professional color grading and dynamic camera movement. The scenes must flow together \
seamlessly with smooth transitions, creating a single, cohesive narrative.";

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleReference {
    pub prompt: String,
    #[serde(default)]
    pub color_palette: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenePrompt {
    pub scene: u32,
    pub duration_seconds: u32,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPrompt {
    pub prompt: String,
    #[serde(default)]
    pub negative_prompt: String,
    pub aspect_ratio: String,
    pub resolution: String,
    pub duration_seconds: u32,
    #[serde(default = "default_true")]
    pub generate_audio: bool,
    #[serde(default = "default_true")]
    pub enhance_prompt: bool,
    pub style_reference: StyleReference,
    #[serde(default)]
    pub scenes: Vec<ScenePrompt>,
}

fn default_true() -> bool {
    true
}

impl VideoPrompt {
    /// Build the prompt for an approved brief.
    pub fn from_brief(brief: &AdBrief) -> Self {
        let style = &brief.style_guidance;
        let tone = if style.tone.trim().is_empty() {
            DEFAULT_TONE
        } else {
            style.tone.trim()
        };
        let style_prompt = format!(
            "A {tone} commercial. The dominant color palette is {}. {STYLE_SUFFIX}",
            style.dominant_colors.join(", ")
        );

        let scenes: Vec<ScenePrompt> = brief
            .script
            .iter()
            .enumerate()
            .map(|(i, s)| ScenePrompt {
                scene: i as u32 + 1,
                duration_seconds: s.duration_seconds,
                prompt: s.visuals.trim().to_string(),
            })
            .collect();

        let visual_descriptions = scenes
            .iter()
            .map(|s| format!("Scene {}: {}", s.scene, s.prompt))
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            prompt: format!("{style_prompt} The story unfolds as follows: {visual_descriptions}"),
            negative_prompt: DEFAULT_NEGATIVE_PROMPT.to_string(),
            aspect_ratio: DEFAULT_ASPECT_RATIO.to_string(),
            resolution: DEFAULT_RESOLUTION.to_string(),
            duration_seconds: clamp_duration(brief.total_duration_secs()),
            generate_audio: true,
            enhance_prompt: true,
            style_reference: StyleReference {
                prompt: style_prompt,
                color_palette: style.dominant_colors.clone(),
            },
            scenes,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.prompt.trim().is_empty() {
            return Err(CoreError::Validation("Video prompt must not be empty".into()));
        }
        if self.prompt.len() > MAX_PROMPT_LENGTH {
            return Err(CoreError::Validation(format!(
                "Video prompt exceeds maximum length of {MAX_PROMPT_LENGTH} characters (got {})",
                self.prompt.len()
            )));
        }
        if self.negative_prompt.len() > MAX_NEGATIVE_PROMPT_LENGTH {
            return Err(CoreError::Validation(format!(
                "Negative prompt exceeds maximum length of {MAX_NEGATIVE_PROMPT_LENGTH} characters"
            )));
        }
        if !VALID_ASPECT_RATIOS.contains(&self.aspect_ratio.as_str()) {
            return Err(CoreError::Validation(format!(
                "Invalid aspect ratio '{}'. Must be one of: {}",
                self.aspect_ratio,
                VALID_ASPECT_RATIOS.join(", ")
            )));
        }
        if !VALID_RESOLUTIONS.contains(&self.resolution.as_str()) {
            return Err(CoreError::Validation(format!(
                "Invalid resolution '{}'. Must be one of: {}",
                self.resolution,
                VALID_RESOLUTIONS.join(", ")
            )));
        }
        if !(MIN_VIDEO_DURATION_SECS..=MAX_VIDEO_DURATION_SECS).contains(&self.duration_seconds) {
            return Err(CoreError::Validation(format!(
                "Video duration must be between {MIN_VIDEO_DURATION_SECS} and \
                 {MAX_VIDEO_DURATION_SECS} seconds (got {})",
                self.duration_seconds
            )));
        }
        Ok(())
    }
}

/// Clamp a script duration into the window the video model supports.
pub fn clamp_duration(total_secs: u32) -> u32 {
    total_secs.clamp(MIN_VIDEO_DURATION_SECS, MAX_VIDEO_DURATION_SECS)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
