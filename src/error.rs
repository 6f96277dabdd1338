//! Error handling for the Sommelier client

use std::fmt;

use serde_json::{json, Value};
use thiserror::Error;

/// Unified error type for the Sommelier client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// File system errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Non-2xx response from the backend
    #[error("API error: {0}")]
    Api(ApiError),

    /// Key-value store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new storage error
    pub fn storage<T: fmt::Display>(msg: T) -> Self {
        Error::Storage(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// The backend error body, if this error came from a non-2xx response
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Text suitable for an alert dialog.
    ///
    /// Prefers the backend's `error` field, then its `message` field, then
    /// the error's own display form.
    pub fn user_message(&self) -> String {
        self.api()
            .and_then(|api| api.error().or_else(|| api.message()))
            .map(str::to_string)
            .unwrap_or_else(|| self.to_string())
    }
}

/// Error body returned by the backend for a non-2xx response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// HTTP status code
    pub status: u16,

    /// The parsed JSON body, or a synthesized `{"error": "HTTP <status>: <reason>"}`
    pub body: Value,
}

impl ApiError {
    /// Wrap a parsed JSON error body
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Build the body used when the response is not JSON
    pub fn synthesized(status: u16, reason: &str) -> Self {
        Self {
            status,
            body: json!({ "error": format!("HTTP {}: {}", status, reason) }),
        }
    }

    /// The `error` field of the body
    pub fn error(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }

    /// The `message` field of the body
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.error().or_else(|| self.message()) {
            Some(text) => write!(f, "{} ({})", text, self.status),
            None => write!(f, "status {}: {}", self.status, self.body),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_body_carries_status_line() {
        let err = ApiError::synthesized(502, "Bad Gateway");
        assert_eq!(err.error(), Some("HTTP 502: Bad Gateway"));
        assert_eq!(err.message(), None);
    }

    #[test]
    fn user_message_prefers_backend_error_field() {
        let err = Error::Api(ApiError::new(
            401,
            json!({ "error": "Invalid credentials", "message": "ignored" }),
        ));
        assert_eq!(err.user_message(), "Invalid credentials");

        let err = Error::Api(ApiError::new(400, json!({ "message": "Bad year" })));
        assert_eq!(err.user_message(), "Bad year");

        let err = Error::general("offline");
        assert_eq!(err.user_message(), "offline");
    }
}
