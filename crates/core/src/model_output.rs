//! Helpers for turning raw model text into typed JSON.
//!
//! Models are asked to answer with bare JSON but regularly wrap it in
//! Markdown fences or surround it with prose.

use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum ModelOutputError {
    #[error("Model returned an empty response")]
    Empty,

    #[error("Model returned invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Strip whitespace and a surrounding ```` ```json ```` / ```` ``` ```` fence.
pub fn clean_model_json(text: &str) -> &str {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```JSON") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

/// Return the outermost `{ ... }` span, if any.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse model output into `T`, tolerating fences and surrounding prose.
pub fn parse_model_json<T: DeserializeOwned>(text: &str) -> Result<T, ModelOutputError> {
    let cleaned = clean_model_json(text);
    if cleaned.is_empty() {
        return Err(ModelOutputError::Empty);
    }
    match serde_json::from_str(cleaned) {
        Ok(value) => Ok(value),
        Err(first_err) => match extract_json_object(cleaned) {
            Some(object) if object.len() < cleaned.len() => {
                serde_json::from_str(object).map_err(ModelOutputError::from)
            }
            _ => Err(first_err.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize, PartialEq)]
    struct Sample {
        usps: Vec<String>,
    }

    #[test]
    fn strips_json_fence() {
        assert_eq!(clean_model_json("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(clean_model_json("  ```\n{}\n```  "), "{}");
        assert_eq!(clean_model_json("{}"), "{}");
    }

    #[test]
    fn parses_fenced_output() {
        let parsed: Sample = parse_model_json("```json\n{\"usps\": [\"fast\"]}\n```").unwrap();
        assert_eq!(parsed.usps, vec!["fast"]);
    }

    #[test]
    fn parses_object_surrounded_by_prose() {
        let parsed: Sample =
            parse_model_json("Here is the analysis: {\"usps\": [\"a\"]} Hope it helps!").unwrap();
        assert_eq!(parsed.usps, vec!["a"]);
    }

    #[test]
    fn empty_output_is_reported() {
        let err = parse_model_json::<Sample>("```json\n```").unwrap_err();
        assert!(matches!(err, ModelOutputError::Empty));
    }

    #[test]
    fn garbage_is_invalid_json() {
        let err = parse_model_json::<Sample>("I cannot help with that").unwrap_err();
        assert!(matches!(err, ModelOutputError::InvalidJson(_)));
    }
}
