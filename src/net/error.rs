//! Errors surfaced by the HTTP wrapper and the stores.

use crate::forms::ValidationErrors;
use crate::net::transport::TransportError;

/// Every way a backend operation can fail.
///
/// Maps onto the failure taxonomy: `Validation` never reaches the network,
/// `Unauthorized` is a 401, `Status` any other error status, `Transport` means
/// no response arrived.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A form was rejected before the request was sent.
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// The backend rejected the credentials (HTTP 401).
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// The backend answered with an error status other than 401.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The backend answered with a success status the operation does not accept.
    #[error("unexpected status {status} (expected {expected})")]
    UnexpectedStatus { status: u16, expected: u16 },

    /// No response was received.
    #[error("{0}")]
    Transport(#[from] TransportError),

    /// The request body could not be serialized.
    #[error("request encode failed: {0}")]
    Encode(String),

    /// The response body did not match the expected schema.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The caller went away before the result could be applied.
    #[error("operation cancelled")]
    Cancelled,
}

impl ApiError {
    /// Grepable code for logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::Unauthorized { .. } => "E_UNAUTHORIZED",
            Self::Status { .. } => "E_STATUS",
            Self::UnexpectedStatus { .. } => "E_UNEXPECTED_STATUS",
            Self::Transport(_) => "E_TRANSPORT",
            Self::Encode(_) => "E_ENCODE",
            Self::Decode(_) => "E_DECODE",
            Self::Cancelled => "E_CANCELLED",
        }
    }

    /// HTTP status, when a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Status { status, .. } | Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Field-level problems, for forms that render them inline.
    #[must_use]
    pub fn validation(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
