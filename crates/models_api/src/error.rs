use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatApiError {
    #[error("access token is required")]
    MissingAccessToken,

    #[error("invalid request header '{0}'")]
    InvalidHeader(&'static str),

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {0}: {1}")]
    Status(StatusCode, String),

    #[error("stream stalled: no data within {0:?}")]
    StreamStalled(Duration),

    #[error("retry exhausted after {attempts} attempts (last error: {last_error})")]
    RetryExhausted { attempts: u32, last_error: String },

    #[error("request was cancelled")]
    Cancelled,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(rename = "error")]
    value: Option<ErrorPayloadFields>,
}

#[derive(Debug, Deserialize)]
struct ErrorPayloadFields {
    message: Option<String>,
}

/// Extract a human-readable message from an error response body.
///
/// The endpoint reports failures as `{"error":{"message":...}}`; anything
/// else falls back to the raw body, then to the status line.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorPayload>(body) {
        let message = parsed
            .value
            .and_then(|error| error.message)
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty());
        if let Some(message) = message {
            return message;
        }
    }

    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::parse_error_message;

    #[test]
    fn structured_error_message_wins() {
        let body = r#"{"error":{"message":"The token lacks the models:read scope"}}"#;
        assert_eq!(
            parse_error_message(StatusCode::FORBIDDEN, body),
            "The token lacks the models:read scope"
        );
    }

    #[test]
    fn unstructured_body_is_reported_verbatim() {
        assert_eq!(
            parse_error_message(StatusCode::BAD_GATEWAY, "upstream unavailable\n"),
            "upstream unavailable"
        );
    }

    #[test]
    fn empty_body_falls_back_to_the_status_line() {
        assert_eq!(
            parse_error_message(StatusCode::UNAUTHORIZED, ""),
            "Unauthorized"
        );
    }

    #[test]
    fn structured_payload_without_message_falls_through() {
        assert_eq!(
            parse_error_message(StatusCode::NOT_FOUND, r#"{"error":{}}"#),
            r#"{"error":{}}"#
        );
    }
}
