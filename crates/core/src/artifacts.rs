//! Artifact layout for a pipeline run.
//!
//! Every run writes its files under `{root}/{run_key}/` using the fixed
//! names below, so reviewers and gate watchers can locate them without a
//! database lookup.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_TEXT: &str = "text/plain";
pub const CONTENT_TYPE_MP4: &str = "video/mp4";

/// Every file a run can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    UspAnalysis,
    StyleAnalysis,
    UspAnalysisApproved,
    StyleAnalysisApproved,
    AdBrief,
    AdBriefApproved,
    VideoPromptDraft,
    VideoPromptApproved,
    FinalVideo,
    ApprovalGate1,
    ApprovalGate2,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 11] = [
        Self::UspAnalysis,
        Self::StyleAnalysis,
        Self::UspAnalysisApproved,
        Self::StyleAnalysisApproved,
        Self::AdBrief,
        Self::AdBriefApproved,
        Self::VideoPromptDraft,
        Self::VideoPromptApproved,
        Self::FinalVideo,
        Self::ApprovalGate1,
        Self::ApprovalGate2,
    ];

    /// File name under the run root.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::UspAnalysis => "analysis_usp.json",
            Self::StyleAnalysis => "analysis_style.json",
            Self::UspAnalysisApproved => "analysis_usp_approved.json",
            Self::StyleAnalysisApproved => "analysis_style_approved.json",
            Self::AdBrief => "ad_brief.json",
            Self::AdBriefApproved => "ad_brief_approved.json",
            Self::VideoPromptDraft => "veo3_prompt_draft.json",
            Self::VideoPromptApproved => "veo3_prompt_approved.json",
            Self::FinalVideo => "final_video.mp4",
            Self::ApprovalGate1 => "approval_gate_1.txt",
            Self::ApprovalGate2 => "approval_gate_2.txt",
        }
    }

    /// Database / URL name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::UspAnalysis => "usp_analysis",
            Self::StyleAnalysis => "style_analysis",
            Self::UspAnalysisApproved => "usp_analysis_approved",
            Self::StyleAnalysisApproved => "style_analysis_approved",
            Self::AdBrief => "ad_brief",
            Self::AdBriefApproved => "ad_brief_approved",
            Self::VideoPromptDraft => "video_prompt_draft",
            Self::VideoPromptApproved => "video_prompt_approved",
            Self::FinalVideo => "final_video",
            Self::ApprovalGate1 => "approval_gate_1",
            Self::ApprovalGate2 => "approval_gate_2",
        }
    }

    /// Parse from the database / URL name.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == name)
            .ok_or_else(|| CoreError::Validation(format!("Unknown artifact kind '{name}'")))
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::FinalVideo => CONTENT_TYPE_MP4,
            Self::ApprovalGate1 | Self::ApprovalGate2 => CONTENT_TYPE_TEXT,
            _ => CONTENT_TYPE_JSON,
        }
    }

    pub fn is_json(self) -> bool {
        self.content_type() == CONTENT_TYPE_JSON
    }
}

/// Root prefix for one run's artifacts.
pub fn run_root(root: &str, run_key: &str) -> String {
    format!("{}/{}", root.trim_end_matches('/'), run_key.trim_matches('/'))
}

/// Full URI of one artifact of a run.
pub fn artifact_uri(root: &str, run_key: &str, kind: ArtifactKind) -> String {
    format!("{}/{}", run_root(root, run_key), kind.file_name())
}

/// Validate that a run key is safe to use as a single path segment.
pub fn validate_run_key(run_key: &str) -> Result<(), CoreError> {
    if run_key.is_empty() || run_key.len() > 128 {
        return Err(CoreError::Validation(
            "Run key must be between 1 and 128 characters".to_string(),
        ));
    }
    if !run_key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(CoreError::Validation(format!(
            "Run key '{run_key}' may only contain letters, digits, '-' and '_'"
        )));
    }
    Ok(())
}
