//! Error type for model calls, plus the reviewer-facing classification
//! stored on failed runs.

use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum GenAiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Model API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("Unexpected model response: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Video generation timed out after {0} seconds")]
    Timeout(u64),

    #[error("Video generation was cancelled")]
    Cancelled,

    #[error("Video generation failed: {0}")]
    GenerationFailed(String),
}

pub const ERROR_MODEL_NOT_FOUND: &str = "MODEL_NOT_FOUND";
pub const ERROR_PERMISSION_DENIED: &str = "PERMISSION_DENIED";
pub const ERROR_AUTHENTICATION: &str = "AUTHENTICATION_ERROR";
pub const ERROR_RATE_LIMITED: &str = "RATE_LIMITED";
pub const ERROR_JSON_PARSE: &str = "JSON_PARSE_ERROR";
pub const ERROR_TIMEOUT: &str = "TIMEOUT";
pub const ERROR_GENERATION_FAILED: &str = "GENERATION_FAILED";
pub const ERROR_UNEXPECTED: &str = "UNEXPECTED_ERROR";

/// Classified failure with a hint for the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetails {
    pub error_type: String,
    pub message: String,
    pub suggestion: String,
}

impl ErrorDetails {
    pub fn new(error_type: &str, message: impl Into<String>, suggestion: &str) -> Self {
        Self {
            error_type: error_type.to_string(),
            message: message.into(),
            suggestion: suggestion.to_string(),
        }
    }

    pub fn classify(err: &GenAiError) -> Self {
        let message = err.to_string();
        match err {
            GenAiError::Api { status: 404, .. } => Self::new(
                ERROR_MODEL_NOT_FOUND,
                message,
                "Check the configured model name and that it is enabled in your project and region.",
            ),
            GenAiError::Api { status: 403, .. } => Self::new(
                ERROR_PERMISSION_DENIED,
                message,
                "Ensure the service account has the 'Vertex AI User' role for this project.",
            ),
            GenAiError::Api { status: 401, .. } => Self::new(
                ERROR_AUTHENTICATION,
                message,
                "Refresh the access token (e.g. `gcloud auth print-access-token`).",
            ),
            GenAiError::Api { status: 429, .. } => Self::new(
                ERROR_RATE_LIMITED,
                message,
                "The model quota is exhausted; wait and resubmit the run.",
            ),
            GenAiError::Parse(_) => Self::new(
                ERROR_JSON_PARSE,
                message,
                "The model returned an unexpected payload. Check the prompt and model version.",
            ),
            GenAiError::Timeout(_) => Self::new(
                ERROR_TIMEOUT,
                message,
                "Increase VIDEO_TIMEOUT_SECS or shorten the requested clip.",
            ),
            GenAiError::GenerationFailed(_) => Self::new(
                ERROR_GENERATION_FAILED,
                message,
                "Review the approved prompt for content the model refuses to render.",
            ),
            _ => Self::new(
                ERROR_UNEXPECTED,
                message,
                "Check your network connection and the model service status.",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> GenAiError {
        GenAiError::Api {
            status,
            body: "{}".into(),
        }
    }

    #[test]
    fn classifies_http_statuses() {
        assert_eq!(ErrorDetails::classify(&api(404)).error_type, ERROR_MODEL_NOT_FOUND);
        assert_eq!(ErrorDetails::classify(&api(403)).error_type, ERROR_PERMISSION_DENIED);
        assert_eq!(ErrorDetails::classify(&api(401)).error_type, ERROR_AUTHENTICATION);
        assert_eq!(ErrorDetails::classify(&api(429)).error_type, ERROR_RATE_LIMITED);
        assert_eq!(ErrorDetails::classify(&api(500)).error_type, ERROR_UNEXPECTED);
    }

    #[test]
    fn classifies_pipeline_failures() {
        let timeout = ErrorDetails::classify(&GenAiError::Timeout(600));
        assert_eq!(timeout.error_type, ERROR_TIMEOUT);
        assert!(timeout.message.contains("600"));

        let failed = ErrorDetails::classify(&GenAiError::GenerationFailed("blocked".into()));
        assert_eq!(failed.error_type, ERROR_GENERATION_FAILED);

        let parse = ErrorDetails::classify(&GenAiError::Parse("no candidates".into()));
        assert_eq!(parse.error_type, ERROR_JSON_PARSE);

        assert_eq!(
            ErrorDetails::classify(&GenAiError::Cancelled).error_type,
            ERROR_UNEXPECTED
        );
    }

    #[test]
    fn every_classification_has_a_suggestion() {
        for err in [api(404), api(403), api(401), api(429), GenAiError::Cancelled] {
            assert!(!ErrorDetails::classify(&err).suggestion.is_empty());
        }
    }
}
