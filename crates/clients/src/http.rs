//! Shared reqwest plumbing for the backend clients.

use mcpgate_core::ClientError;
use std::time::Duration;
use tracing::{debug, warn};

/// Build an HTTP client bounded by `timeout`.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, ClientError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ClientError::NotConfigured(format!("failed to create HTTP client: {e}")))
}

/// Send a request and return the raw body of a successful response.
pub(crate) async fn send_text(
    action: &str,
    request: reqwest::RequestBuilder,
    timeout: Duration,
) -> Result<String, ClientError> {
    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            ClientError::Timeout {
                action: action.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }
        } else {
            ClientError::Network(e.to_string())
        }
    })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ClientError::Network(e.to_string()))?;

    if !status.is_success() {
        let message = error_message(&body);
        warn!(action, status = status.as_u16(), error = %message, "Backend returned error");
        return Err(ClientError::Backend {
            status_code: status.as_u16(),
            message,
        });
    }

    debug!(action, status = status.as_u16(), bytes = body.len(), "Backend call succeeded");
    Ok(body)
}

/// Send a request and decode a successful JSON body. An empty body decodes as `[]`.
pub(crate) async fn send_json(
    action: &str,
    request: reqwest::RequestBuilder,
    timeout: Duration,
) -> Result<serde_json::Value, ClientError> {
    let body = send_text(action, request, timeout).await?;
    if body.trim().is_empty() {
        return Ok(serde_json::Value::Array(Vec::new()));
    }
    serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Pull a readable message out of an error body (`message` or `error` field), or use it raw.
fn error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| v.get("message").or_else(|| v.get("error")))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_json_message() {
        assert_eq!(
            error_message(r#"{"message":"relation does not exist","code":"42P01"}"#),
            "relation does not exist"
        );
        assert_eq!(error_message(r#"{"error":"bad token"}"#), "bad token");
        assert_eq!(error_message("  plain failure \n"), "plain failure");
    }
}
