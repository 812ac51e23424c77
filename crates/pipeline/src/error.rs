//! Pipeline error type and its mapping onto stored error details.

use adapt_cloud::StorageError;
use adapt_core::error::CoreError;
use adapt_genai::error::{ErrorDetails, ERROR_UNEXPECTED};
use adapt_genai::GenAiError;

pub const ERROR_INVALID_INPUT: &str = "INVALID_INPUT";
pub const ERROR_STORAGE: &str = "STORAGE_ERROR";
pub const ERROR_GATE_CLOSED: &str = "GATE_CLOSED";

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    GenAi(#[from] GenAiError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Fetching a landing page, image or video over HTTP failed.
    #[error("HTTP fetch failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A post-checkpoint job ran before its approval gate was written.
    #[error("Approval gate {gate} is missing for run {run_key}")]
    GateClosed { run_key: String, gate: &'static str },
}

impl PipelineError {
    /// Operator-facing classification stored on failed runs and jobs.
    pub fn details(&self) -> ErrorDetails {
        match self {
            Self::GenAi(err) => ErrorDetails::classify(err),
            Self::InvalidInput(msg) => ErrorDetails::new(
                ERROR_INVALID_INPUT,
                msg.clone(),
                "Fix the run inputs and submit a new run.",
            ),
            Self::Core(CoreError::Validation(msg)) => ErrorDetails::new(
                ERROR_INVALID_INPUT,
                msg.clone(),
                "Correct the reviewed artifact and submit a new run.",
            ),
            Self::Storage(err) => ErrorDetails::new(
                ERROR_STORAGE,
                err.to_string(),
                "Check the storage backend configuration and bucket permissions.",
            ),
            Self::GateClosed { .. } => ErrorDetails::new(
                ERROR_GATE_CLOSED,
                self.to_string(),
                "Approve the pending review task before resuming the run.",
            ),
            other => ErrorDetails::new(
                ERROR_UNEXPECTED,
                other.to_string(),
                "Check the worker logs for details.",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adapt_genai::error::ERROR_RATE_LIMITED;

    #[test]
    fn model_errors_keep_their_classification() {
        let err = PipelineError::from(GenAiError::Api {
            status: 429,
            body: "quota".into(),
        });
        assert_eq!(err.details().error_type, ERROR_RATE_LIMITED);
    }

    #[test]
    fn gate_closed_names_gate_and_run() {
        let err = PipelineError::GateClosed {
            run_key: "run-1".into(),
            gate: "approval_gate_1.txt",
        };
        assert_eq!(
            err.to_string(),
            "Approval gate approval_gate_1.txt is missing for run run-1"
        );
        assert_eq!(err.details().error_type, ERROR_GATE_CLOSED);
    }

    #[test]
    fn validation_maps_to_invalid_input() {
        let err = PipelineError::from(CoreError::Validation("bad hook".into()));
        let details = err.details();
        assert_eq!(details.error_type, ERROR_INVALID_INPUT);
        assert_eq!(details.message, "bad hook");
    }
}
