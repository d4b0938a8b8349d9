//! Error types for the whatsamenu API client.
//!
//! # Design
//! Every failure a resource method can produce lands in one enum so callers
//! match on the variant instead of inspecting shapes. Local validation
//! failures (`SchemaViolation`, `Validation`) are always raised before a
//! request is built. `Transport` carries the normalized error envelope of a
//! non-2xx response; `Network` is a round-trip that never produced a
//! response at all.
//!
//! The single-message variants display as the bare message so the text can
//! be shown to an end user or compared in tests without trimming prefixes.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::schema::Violations;

/// Errors returned by `MenuHttpClient` and the resource clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The input failed schema validation. Holds every violation, ordered by
    /// field declaration.
    #[error("schema validation failed:\n{0}")]
    SchemaViolation(Violations),

    /// A single-rule check failed (password strength, upload file, alias,
    /// GPS coordinates).
    #[error("{0}")]
    Validation(String),

    /// The server answered with a non-2xx status. `body` holds the fields of
    /// the response's JSON object.
    #[error("HTTP {status}: {}", Value::Object(.body.clone()))]
    Transport { status: u16, body: Map<String, Value> },

    /// The request never produced a response (connection refused, DNS,
    /// timeout, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The client could not be constructed from the supplied configuration.
    #[error("{0}")]
    Configuration(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    /// HTTP status of a normalized transport error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Schema violations, when this error came from schema validation.
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            ApiError::SchemaViolation(violations) => Some(violations),
            _ => None,
        }
    }

    /// True for a normalized transport error with status 404.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_message_variants_display_bare_text() {
        let err = ApiError::validation("invalid GPS coordinates");
        assert_eq!(err.to_string(), "invalid GPS coordinates");

        let err = ApiError::Configuration("unexpected API Key token received: xx".to_string());
        assert_eq!(err.to_string(), "unexpected API Key token received: xx");
    }

    #[test]
    fn transport_error_exposes_status() {
        let body = json!({"error": "restaurant not found"});
        let err = ApiError::Transport {
            status: 404,
            body: body.as_object().cloned().unwrap_or_default(),
        };
        assert_eq!(err.status(), Some(404));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), r#"HTTP 404: {"error":"restaurant not found"}"#);
    }

    #[test]
    fn network_error_has_no_status() {
        let err = ApiError::Network("connection refused".to_string());
        assert_eq!(err.status(), None);
        assert!(err.violations().is_none());
    }
}
