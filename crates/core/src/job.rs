//! Background job types executed by the worker.
//!
//! Each job drives one stage of a run. Post-checkpoint jobs additionally
//! require the matching approval gate to exist before they may run.

use serde::{Deserialize, Serialize};

use crate::artifacts::ArtifactKind;
use crate::error::CoreError;
use crate::run::RunStage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Analyze,
    GenerateBrief,
    GenerateVideo,
}

impl JobType {
    pub const ALL: [JobType; 3] = [Self::Analyze, Self::GenerateBrief, Self::GenerateVideo];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Analyze => "analyze",
            Self::GenerateBrief => "generate_brief",
            Self::GenerateVideo => "generate_video",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == value)
            .ok_or_else(|| CoreError::Validation(format!("Unknown job type '{value}'")))
    }

    /// Stage the run must be in when the job is picked up.
    pub fn expected_stage(self) -> RunStage {
        match self {
            Self::Analyze => RunStage::Pending,
            Self::GenerateBrief => RunStage::GeneratingBrief,
            Self::GenerateVideo => RunStage::GeneratingVideo,
        }
    }

    /// Gate file that must exist before the job may run.
    pub fn required_gate(self) -> Option<ArtifactKind> {
        match self {
            Self::Analyze => None,
            Self::GenerateBrief => Some(ArtifactKind::ApprovalGate1),
            Self::GenerateVideo => Some(ArtifactKind::ApprovalGate2),
        }
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
