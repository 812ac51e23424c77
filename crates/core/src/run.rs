//! Pipeline run lifecycle.
//!
//! A run moves through the stages below. The discriminants match the seed
//! order of the `run_stages` lookup table.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Stage of a pipeline run.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    Pending = 1,
    Analyzing = 2,
    AwaitingAnalysisReview = 3,
    GeneratingBrief = 4,
    AwaitingPromptReview = 5,
    GeneratingVideo = 6,
    Completed = 7,
    Failed = 8,
    Rejected = 9,
}

impl RunStage {
    pub const ALL: [RunStage; 9] = [
        Self::Pending,
        Self::Analyzing,
        Self::AwaitingAnalysisReview,
        Self::GeneratingBrief,
        Self::AwaitingPromptReview,
        Self::GeneratingVideo,
        Self::Completed,
        Self::Failed,
        Self::Rejected,
    ];

    /// Database id of the stage.
    pub fn id(self) -> i16 {
        self as i16
    }

    pub fn from_id(id: i16) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|s| s.id() == id)
            .ok_or_else(|| CoreError::Validation(format!("Unknown run stage id {id}")))
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Analyzing => "analyzing",
            Self::AwaitingAnalysisReview => "awaiting_analysis_review",
            Self::GeneratingBrief => "generating_brief",
            Self::AwaitingPromptReview => "awaiting_prompt_review",
            Self::GeneratingVideo => "generating_video",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Rejected => "rejected",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| CoreError::Validation(format!("Unknown run stage '{name}'")))
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Rejected)
    }

    /// `true` while the run is paused for a human decision.
    pub fn is_awaiting_review(self) -> bool {
        matches!(
            self,
            Self::AwaitingAnalysisReview | Self::AwaitingPromptReview
        )
    }

    /// Whether the state machine allows moving from `self` to `to`.
    pub fn can_transition_to(self, to: RunStage) -> bool {
        use RunStage::*;
        if self.is_terminal() {
            return false;
        }
        if to == Failed {
            return true;
        }
        matches!(
            (self, to),
            (Pending, Analyzing)
                | (Analyzing, AwaitingAnalysisReview)
                | (AwaitingAnalysisReview, GeneratingBrief)
                | (AwaitingAnalysisReview, Rejected)
                | (GeneratingBrief, AwaitingPromptReview)
                | (AwaitingPromptReview, GeneratingVideo)
                | (AwaitingPromptReview, Rejected)
                | (GeneratingVideo, Completed)
        )
    }
}

impl std::fmt::Display for RunStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Validate a stage transition, returning a conflict error when illegal.
pub fn validate_transition(from: RunStage, to: RunStage) -> Result<(), CoreError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Run cannot move from '{from}' to '{to}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_is_allowed() {
        let path = [
            RunStage::Pending,
            RunStage::Analyzing,
            RunStage::AwaitingAnalysisReview,
            RunStage::GeneratingBrief,
            RunStage::AwaitingPromptReview,
            RunStage::GeneratingVideo,
            RunStage::Completed,
        ];
        for pair in path.windows(2) {
            assert!(
                validate_transition(pair[0], pair[1]).is_ok(),
                "{} -> {} should be allowed",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn stages_cannot_be_skipped() {
        assert!(validate_transition(RunStage::Pending, RunStage::GeneratingBrief).is_err());
        assert!(validate_transition(RunStage::Analyzing, RunStage::GeneratingBrief).is_err());
        assert!(
            validate_transition(RunStage::AwaitingAnalysisReview, RunStage::GeneratingVideo)
                .is_err()
        );
    }

    #[test]
    fn terminal_stages_are_final() {
        for terminal in [RunStage::Completed, RunStage::Failed, RunStage::Rejected] {
            for to in RunStage::ALL {
                assert!(!terminal.can_transition_to(to));
            }
        }
    }

    #[test]
    fn any_active_stage_can_fail() {
        for from in RunStage::ALL.into_iter().filter(|s| !s.is_terminal()) {
            assert!(from.can_transition_to(RunStage::Failed));
        }
    }

    #[test]
    fn only_review_stages_can_be_rejected() {
        for from in RunStage::ALL {
            let allowed = from.can_transition_to(RunStage::Rejected);
            assert_eq!(allowed, from.is_awaiting_review(), "{from}");
        }
    }

    #[test]
    fn ids_and_names_round_trip() {
        for stage in RunStage::ALL {
            assert_eq!(RunStage::from_id(stage.id()).unwrap(), stage);
            assert_eq!(RunStage::from_name(stage.name()).unwrap(), stage);
        }
        assert!(RunStage::from_id(0).is_err());
        assert!(RunStage::from_name("paused").is_err());
    }

    #[test]
    fn illegal_transition_is_conflict() {
        let err = validate_transition(RunStage::Completed, RunStage::Analyzing).unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }
}
