//! USP and brand style analysis payloads.
//!
//! Both analysis stages write their output wrapped in an
//! [`AnalysisEnvelope`] so reviewers and downstream stages can tell which
//! payload version they are reading.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Version tag written into every analysis envelope.
pub const ANALYSIS_VERSION: &str = "1.0";

/// Maximum number of unique selling propositions kept per analysis.
pub const MAX_USPS: usize = 5;

/// Maximum number of emotional triggers kept per analysis.
pub const MAX_EMOTIONS: usize = 5;

/// Maximum number of dominant colors kept per style analysis.
pub const MAX_DOMINANT_COLORS: usize = 5;

/// Maximum number of words in a style description field.
pub const MAX_STYLE_FIELD_WORDS: usize = 50;

/// Number of characters of the raw response kept as `font_style` when the
/// model output cannot be parsed.
const FALLBACK_FONT_STYLE_CHARS: usize = 100;

static HEX_COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid regex")
});

/// Return `true` if `value` is a `#RGB` or `#RRGGBB` hex color.
pub fn is_valid_hex_color(value: &str) -> bool {
    HEX_COLOR_RE.is_match(value)
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// On-disk wrapper for an analysis artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisEnvelope<T> {
    pub version: String,
    pub analysis: T,
}

impl<T> AnalysisEnvelope<T> {
    pub fn new(analysis: T) -> Self {
        Self {
            version: ANALYSIS_VERSION.to_string(),
            analysis,
        }
    }
}

// ---------------------------------------------------------------------------
// USP analysis
// ---------------------------------------------------------------------------

/// Unique selling propositions and emotional triggers for a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UspAnalysis {
    #[serde(default)]
    pub usps: Vec<String>,
    #[serde(default)]
    pub emotions: Vec<String>,
}

impl UspAnalysis {
    /// Fallback used when the model response is not valid JSON: the first
    /// non-empty line of the response becomes the only USP.
    pub fn fallback(raw_response: &str) -> Self {
        let first_line = raw_response
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or_default()
            .to_string();
        Self {
            usps: if first_line.is_empty() {
                Vec::new()
            } else {
                vec![first_line]
            },
            emotions: Vec::new(),
        }
    }

    /// Trim, de-duplicate (case-insensitively), and cap both lists.
    pub fn normalized(self) -> Self {
        Self {
            usps: normalize_entries(self.usps, MAX_USPS),
            emotions: normalize_entries(self.emotions, MAX_EMOTIONS),
        }
    }

    /// An approved analysis must carry at least one USP.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.usps.is_empty() {
            return Err(CoreError::Validation(
                "USP analysis must contain at least one USP".to_string(),
            ));
        }
        if self.usps.len() > MAX_USPS {
            return Err(CoreError::Validation(format!(
                "USP analysis may contain at most {MAX_USPS} USPs (got {})",
                self.usps.len()
            )));
        }
        if self.emotions.len() > MAX_EMOTIONS {
            return Err(CoreError::Validation(format!(
                "USP analysis may contain at most {MAX_EMOTIONS} emotions (got {})",
                self.emotions.len()
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Style analysis
// ---------------------------------------------------------------------------

/// A single dominant brand color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSwatch")]
pub struct ColorSwatch {
    pub hex_code: String,
    pub name: String,
}

/// Models answer with either `{ "hex_code", "name" }` objects or bare hex
/// strings; both are accepted.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSwatch {
    Full {
        hex_code: String,
        #[serde(default)]
        name: String,
    },
    Bare(String),
}

impl From<RawSwatch> for ColorSwatch {
    fn from(raw: RawSwatch) -> Self {
        match raw {
            RawSwatch::Full { hex_code, name } => Self { hex_code, name },
            RawSwatch::Bare(hex_code) => Self {
                hex_code,
                name: String::new(),
            },
        }
    }
}

/// Brand style extracted from creatives and logos.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleAnalysis {
    #[serde(default)]
    pub dominant_colors: Vec<ColorSwatch>,
    #[serde(default)]
    pub font_style: String,
    #[serde(default)]
    pub tone_of_voice: String,
    #[serde(default)]
    pub aesthetic: String,
}

impl StyleAnalysis {
    /// Fallback used when the model response is not valid JSON.
    pub fn fallback(raw_response: &str) -> Self {
        Self {
            dominant_colors: vec![ColorSwatch {
                hex_code: "#000000".to_string(),
                name: "black".to_string(),
            }],
            font_style: raw_response
                .trim()
                .chars()
                .take(FALLBACK_FONT_STYLE_CHARS)
                .collect(),
            tone_of_voice: "Unknown".to_string(),
            aesthetic: "Undetermined".to_string(),
        }
    }

    /// Drop invalid colors, cap the palette, and clamp descriptions to the
    /// word limit.
    pub fn normalized(self) -> Self {
        let mut seen = HashSet::new();
        let dominant_colors = self
            .dominant_colors
            .into_iter()
            .map(|c| ColorSwatch {
                hex_code: c.hex_code.trim().to_uppercase(),
                name: c.name.trim().to_string(),
            })
            .filter(|c| is_valid_hex_color(&c.hex_code))
            .filter(|c| seen.insert(c.hex_code.clone()))
            .take(MAX_DOMINANT_COLORS)
            .collect();

        Self {
            dominant_colors,
            font_style: truncate_words(&self.font_style, MAX_STYLE_FIELD_WORDS),
            tone_of_voice: truncate_words(&self.tone_of_voice, MAX_STYLE_FIELD_WORDS),
            aesthetic: truncate_words(&self.aesthetic, MAX_STYLE_FIELD_WORDS),
        }
    }

    /// Hex codes of the palette, in order.
    pub fn hex_codes(&self) -> Vec<String> {
        self.dominant_colors
            .iter()
            .map(|c| c.hex_code.clone())
            .collect()
    }

    /// Validate a reviewer-edited style analysis.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.dominant_colors.len() > MAX_DOMINANT_COLORS {
            return Err(CoreError::Validation(format!(
                "Style analysis may contain at most {MAX_DOMINANT_COLORS} colors (got {})",
                self.dominant_colors.len()
            )));
        }
        if let Some(bad) = self
            .dominant_colors
            .iter()
            .find(|c| !is_valid_hex_color(&c.hex_code))
        {
            return Err(CoreError::Validation(format!(
                "Invalid hex color '{}'",
                bad.hex_code
            )));
        }
        for (field, value) in [
            ("font_style", &self.font_style),
            ("tone_of_voice", &self.tone_of_voice),
            ("aesthetic", &self.aesthetic),
        ] {
            let words = value.split_whitespace().count();
            if words > MAX_STYLE_FIELD_WORDS {
                return Err(CoreError::Validation(format!(
                    "{field} exceeds {MAX_STYLE_FIELD_WORDS} words (got {words})"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Split newline-separated reviewer input into trimmed, non-empty entries.
pub fn parse_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_entries(entries: Vec<String>, cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .filter(|e| seen.insert(e.to_lowercase()))
        .take(cap)
        .collect()
}

fn truncate_words(text: &str, max_words: usize) -> String {
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
