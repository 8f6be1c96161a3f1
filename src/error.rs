use std::fmt;

use serde::{Deserialize, Serialize};

/// All errors that can be returned by the client.
///
/// Ordinary API failures arrive as [`OpenCloudError::Api`] carrying the envelope the
/// server sent, or as [`OpenCloudError::Status`] when the body is JSON of some other shape.
/// The remaining variants are hard failures on the client side.
#[derive(Debug, thiserror::Error)]
pub enum OpenCloudError {
    #[error("Open Cloud error: {0}")]
    Api(ErrorEnvelope),

    /// A failed request whose JSON body is not an Open Cloud envelope,
    /// e.g. the gateway's `{"errors": [...]}` or an unknown error code.
    #[error("Open Cloud request failed with status {status}: {body}")]
    Status {
        status: u16,
        body: serde_json::Value,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid {encoding} input: {reason}")]
    Encoding {
        encoding: &'static str,
        reason: String,
    },
}

impl OpenCloudError {
    /// The envelope returned by the server, if this is an API error.
    pub fn envelope(&self) -> Option<&ErrorEnvelope> {
        match self {
            OpenCloudError::Api(envelope) => Some(envelope),
            _ => None,
        }
    }

    /// The Open Cloud error code, if this is an API error.
    pub fn code(&self) -> Option<ErrorCode> {
        self.envelope().map(|e| e.code)
    }
}

pub type Result<T> = std::result::Result<T, OpenCloudError>;

/// Error codes documented for Open Cloud responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidArgument,
    InsufficientScope,
    PermissionDenied,
    NotFound,
    Aborted,
    ResourceExhausted,
    Cancelled,
    Internal,
    NotImplemented,
    Unavailable,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::InsufficientScope => "INSUFFICIENT_SCOPE",
            ErrorCode::PermissionDenied => "PERMISSION_DENIED",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Aborted => "ABORTED",
            ErrorCode::ResourceExhausted => "RESOURCE_EXHAUSTED",
            ErrorCode::Cancelled => "CANCELLED",
            ErrorCode::Internal => "INTERNAL",
            ErrorCode::NotImplemented => "NOT_IMPLEMENTED",
            ErrorCode::Unavailable => "UNAVAILABLE",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error body returned by Open Cloud on a failed request.
///
/// Messaging and place publishing spell the keys `Error`/`Message`/`ErrorDetails`,
/// the v1 data-store endpoints use `error`/`message`/`errorDetails`. Both decode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(rename = "Error", alias = "error")]
    pub code: ErrorCode,
    #[serde(rename = "Message", alias = "message", default)]
    pub message: String,
    #[serde(
        rename = "ErrorDetails",
        alias = "errorDetails",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub details: Option<Vec<serde_json::Value>>,
}

impl fmt::Display for ErrorEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}
