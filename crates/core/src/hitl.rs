//! Human-in-the-loop checkpoint constants and validation.
//!
//! A run pauses twice: after the analyses (`analysis_review`) and after the
//! brief has been drafted (`prompt_review`). Approving a task writes its gate
//! file, which unblocks the following stage.

use crate::artifacts::ArtifactKind;
use crate::error::CoreError;

/// First checkpoint: review of the USP and style analyses.
pub const TASK_ANALYSIS_REVIEW: &str = "analysis_review";

/// Second checkpoint: review of the brief and the video prompt.
pub const TASK_PROMPT_REVIEW: &str = "prompt_review";

/// All valid task names, in pipeline order.
pub const VALID_TASK_NAMES: &[&str] = &[TASK_ANALYSIS_REVIEW, TASK_PROMPT_REVIEW];

pub const DECISION_APPROVED: &str = "approved";
pub const DECISION_REJECTED: &str = "rejected";

/// All valid decision values.
pub const VALID_DECISIONS: &[&str] = &[DECISION_APPROVED, DECISION_REJECTED];

/// Reviewer a new task is assigned to when none is configured.
pub const DEFAULT_ASSIGNEE: &str = "creative_team@example.com";

/// Body of an approval gate file.
pub const GATE_CONTENT: &str = "approved";

/// Maximum length of a reviewer comment.
pub const MAX_COMMENT_LENGTH: usize = 2_000;

/// Validate that a task name is one of the known checkpoints.
pub fn validate_task_name(name: &str) -> Result<(), CoreError> {
    if VALID_TASK_NAMES.contains(&name) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid task name '{name}'. Must be one of: {}",
            VALID_TASK_NAMES.join(", ")
        )))
    }
}

/// Validate that a decision string is one of the accepted values.
pub fn validate_decision(decision: &str) -> Result<(), CoreError> {
    if VALID_DECISIONS.contains(&decision) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid decision '{decision}'. Must be one of: {}",
            VALID_DECISIONS.join(", ")
        )))
    }
}

/// A rejection must explain itself; comments are capped in length.
pub fn validate_comment(decision: &str, comment: Option<&str>) -> Result<(), CoreError> {
    let comment = comment.map(str::trim).unwrap_or_default();
    if decision == DECISION_REJECTED && comment.is_empty() {
        return Err(CoreError::Validation(
            "Rejections must include a comment".to_string(),
        ));
    }
    if comment.len() > MAX_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Comment exceeds maximum length of {MAX_COMMENT_LENGTH} characters"
        )));
    }
    Ok(())
}

/// The reviewer identity recorded on a decision must be present.
pub fn validate_reviewer(reviewer: &str) -> Result<(), CoreError> {
    if reviewer.trim().is_empty() {
        return Err(CoreError::Validation(
            "decided_by must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Gate file opened by approving the given task.
pub fn gate_for_task(task_name: &str) -> Result<ArtifactKind, CoreError> {
    match task_name {
        TASK_ANALYSIS_REVIEW => Ok(ArtifactKind::ApprovalGate1),
        TASK_PROMPT_REVIEW => Ok(ArtifactKind::ApprovalGate2),
        other => Err(CoreError::Validation(format!(
            "No approval gate for task '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_task_names_accepted() {
        assert!(validate_task_name(TASK_ANALYSIS_REVIEW).is_ok());
        assert!(validate_task_name(TASK_PROMPT_REVIEW).is_ok());
        assert!(validate_task_name("final_review").is_err());
    }

    #[test]
    fn decisions_validated() {
        assert!(validate_decision(DECISION_APPROVED).is_ok());
        assert!(validate_decision(DECISION_REJECTED).is_ok());
        let err = validate_decision("flagged").unwrap_err();
        assert!(err.to_string().contains("Invalid decision"));
    }

    #[test]
    fn rejection_requires_comment() {
        assert!(validate_comment(DECISION_REJECTED, None).is_err());
        assert!(validate_comment(DECISION_REJECTED, Some("  ")).is_err());
        assert!(validate_comment(DECISION_REJECTED, Some("off-brand colors")).is_ok());
        assert!(validate_comment(DECISION_APPROVED, None).is_ok());
    }

    #[test]
    fn overlong_comment_rejected() {
        let long = "x".repeat(MAX_COMMENT_LENGTH + 1);
        assert!(validate_comment(DECISION_APPROVED, Some(&long)).is_err());
    }

    #[test]
    fn blank_reviewer_rejected() {
        assert!(validate_reviewer(" ").is_err());
        assert!(validate_reviewer("ana@example.com").is_ok());
    }

    #[test]
    fn gates_map_to_checkpoints() {
        assert_eq!(
            gate_for_task(TASK_ANALYSIS_REVIEW).unwrap(),
            ArtifactKind::ApprovalGate1
        );
        assert_eq!(
            gate_for_task(TASK_PROMPT_REVIEW).unwrap(),
            ArtifactKind::ApprovalGate2
        );
        assert!(gate_for_task("other").is_err());
    }
}
