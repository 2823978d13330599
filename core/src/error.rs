//! Error types for the API client.
//!
//! # Design
//! Four kinds, so callers can branch on where a call failed: before the
//! network (`Encoding`), in the network (`Transport`), at the server
//! (`Api`), or in an unexpected 2xx payload (`Decode`). None of them are
//! recovered inside the crate.

use serde::Deserialize;
use thiserror::Error;

use crate::http::BoxError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The request body or query could not be encoded. Raised before any I/O.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// The transport could not complete the round trip.
    #[error("transport failed")]
    Transport(#[source] BoxError),

    /// The server answered with a non-2xx status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A 2xx response body did not have the expected envelope shape.
    #[error("decoding failed: {0}")]
    Decode(String),
}

impl Error {
    /// Status code of an `Api` error, `None` for every other kind.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api(e) => Some(e.status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api(e) if e.is_not_found())
    }
}

/// A non-2xx response as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("HTTP {status}: {message}")]
pub struct ApiError {
    pub status: u16,
    /// Server-side error code, when the payload carried one.
    pub code: Option<String>,
    pub message: String,
    /// Per-field failures from a validation error payload.
    pub validation: Vec<ValidationIssue>,
}

/// One field-level failure inside a validation error payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub key: String,
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Build from a raw status and body.
    ///
    /// Understands `{"error": {"code", "message"}}` and the validation shape
    /// `{"errors": [{"error": {"key", "errors": [{"code", "message"}]}}]}`.
    /// Anything else keeps the raw body as the message.
    pub fn from_response(status: u16, body: &str) -> Self {
        if let Ok(payload) = serde_json::from_str::<ErrorPayload>(body) {
            match payload {
                ErrorPayload::Single { error } => {
                    return Self {
                        status,
                        code: error.code.map(code_to_string),
                        message: error.message.unwrap_or_default(),
                        validation: Vec::new(),
                    };
                }
                ErrorPayload::Validation { errors } => {
                    let validation: Vec<ValidationIssue> = errors
                        .into_iter()
                        .flat_map(|entry| {
                            let key = entry.error.key;
                            entry.error.errors.into_iter().map(move |e| ValidationIssue {
                                key: key.clone(),
                                code: code_to_string(e.code),
                                message: e.message,
                            })
                        })
                        .collect();
                    return Self {
                        status,
                        code: None,
                        message: "Validation error".to_string(),
                        validation,
                    };
                }
            }
        }

        Self {
            status,
            code: None,
            message: body.to_string(),
            validation: Vec::new(),
        }
    }
}

// Codes arrive as numbers for plain errors and as strings for validation.
fn code_to_string(code: serde_json::Value) -> String {
    match code {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorPayload {
    Single { error: ErrorBody },
    Validation { errors: Vec<ValidationEntry> },
}

#[derive(Deserialize)]
struct ErrorBody {
    code: Option<serde_json::Value>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct ValidationEntry {
    error: ValidationBody,
}

#[derive(Deserialize)]
struct ValidationBody {
    key: String,
    #[serde(default)]
    errors: Vec<ValidationDetail>,
}

#[derive(Deserialize)]
struct ValidationDetail {
    code: serde_json::Value,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_error_payload() {
        let err = ApiError::from_response(
            404,
            r#"{"error":{"code":404,"message":"Comment Not Found"}}"#,
        );
        assert_eq!(err.status, 404);
        assert_eq!(err.code.as_deref(), Some("404"));
        assert_eq!(err.message, "Comment Not Found");
        assert!(err.validation.is_empty());
        assert!(err.is_not_found());
    }

    #[test]
    fn validation_error_payload() {
        let body = r#"{"errors":[{"error":{"key":"text","errors":[
            {"code":"isEmpty","message":"Value is required and can't be empty"}
        ]}}]}"#;
        let err = ApiError::from_response(400, body);
        assert_eq!(err.message, "Validation error");
        assert_eq!(
            err.validation,
            vec![ValidationIssue {
                key: "text".to_string(),
                code: "isEmpty".to_string(),
                message: "Value is required and can't be empty".to_string(),
            }]
        );
    }

    #[test]
    fn unrecognized_body_is_kept_raw() {
        let err = ApiError::from_response(502, "bad gateway");
        assert_eq!(err.message, "bad gateway");
        assert!(err.code.is_none());
        assert_eq!(err.to_string(), "HTTP 502: bad gateway");
    }

    #[test]
    fn status_only_for_api_errors() {
        let api = Error::from(ApiError::from_response(500, ""));
        assert_eq!(api.status(), Some(500));
        assert!(!api.is_not_found());
        assert_eq!(Error::Decode("x".to_string()).status(), None);
    }

    #[test]
    fn transport_detail_lives_in_source() {
        let err = Error::Transport("boom".into());
        assert_eq!(err.to_string(), "transport failed");
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "boom");
    }
}
