//! Response helpers shared by the REST clients.

use serde::de::DeserializeOwned;

use crate::error::GenAiError;

/// Return the response unchanged on a 2xx status, otherwise an
/// [`GenAiError::Api`] carrying the status and body text.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, GenAiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read body>".to_string());
        return Err(GenAiError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Check the status and deserialize the JSON body.
pub(crate) async fn parse_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, GenAiError> {
    let response = ensure_success(response).await?;
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| GenAiError::Parse(format!("{e}: {text}")))
}
