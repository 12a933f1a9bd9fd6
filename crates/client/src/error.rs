//! Error type shared by the HTTP layer, the session store and the services.

use reqwest::StatusCode;
use shopfront_core::api::{ErrorBody, ErrorCode};
use thiserror::Error;

/// Why a token refresh did not produce a usable session.
///
/// Cloned into every request that was queued behind the refresh, so it only
/// carries plain data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshFailure {
    /// The refresh endpoint answered with an error status.
    #[error("refresh rejected with HTTP {status}: {message}")]
    Rejected {
        /// Status returned by `POST /auth/refresh`.
        status: StatusCode,
        /// Server message, or the status reason.
        message: String,
    },
    /// The refresh call never reached the server or its reply was unreadable.
    #[error("refresh transport error: {0}")]
    Transport(String),
    /// The refresh call did not finish within the configured timeout.
    #[error("refresh timed out after {0:?}")]
    TimedOut(std::time::Duration),
    /// The refresh leader went away before reporting an outcome.
    #[error("refresh abandoned before completing")]
    Abandoned,
}

/// Errors returned by every client operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or transport failure. Never retried.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status}{}", format_body(.body))]
    Status {
        /// Response status.
        status: StatusCode,
        /// Parsed failure body (empty when the body was not JSON).
        body: ErrorBody,
    },

    /// A token refresh was required and failed.
    #[error("Session refresh failed: {0}")]
    RefreshFailed(#[from] RefreshFailure),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A request path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The request could not be built (e.g. bad multipart MIME type).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The server answered 2xx but reported failure in the envelope.
    #[error("Rejected by server: {0}")]
    Rejected(String),
}

fn format_body(body: &ErrorBody) -> String {
    match (body.code.as_ref(), body.message()) {
        (Some(code), Some(message)) => format!(" [{code}]: {message}"),
        (Some(code), None) => format!(" [{code}]"),
        (None, Some(message)) => format!(": {message}"),
        (None, None) => String::new(),
    }
}

impl ApiError {
    /// HTTP status of the failure, if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::RefreshFailed(RefreshFailure::Rejected { status, .. }) => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }

    /// Server failure code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&ErrorCode> {
        match self {
            Self::Status { body, .. } => body.code.as_ref(),
            _ => None,
        }
    }

    /// Server message, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => body.message(),
            Self::Rejected(message) => Some(message),
            _ => None,
        }
    }

    /// Whether the server answered 401.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Whether the request never got an answer from the server.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;
