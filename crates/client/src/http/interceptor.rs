//! Response interception: deciding what a failed request means for the
//! session.

use std::fmt;
use std::str::FromStr;

use reqwest::StatusCode;
use shopfront_core::api::ErrorCode;

use super::ApiRequest;
use crate::error::ApiError;
use crate::navigation::is_auth_page;

/// How 403 responses are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ForbiddenPolicy {
    /// End the session and redirect to the login page.
    #[default]
    ClearAndRedirect,
    /// Hand the error to the caller untouched.
    Propagate,
}

impl FromStr for ForbiddenPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clear" => Ok(Self::ClearAndRedirect),
            "propagate" => Ok(Self::Propagate),
            other => Err(format!("expected `clear` or `propagate`, got `{other}`")),
        }
    }
}

/// Why the HTTP layer ended the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// 401 with `AUTHENTICATION_REQUIRED` or without a code.
    Unauthenticated,
    /// 403 under [`ForbiddenPolicy::ClearAndRedirect`].
    Forbidden,
    /// A token refresh failed.
    RefreshFailed,
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden => "forbidden",
            Self::RefreshFailed => "refresh failed",
        })
    }
}

/// Receives session-ending events from the HTTP layer.
///
/// Implemented by the session store and registered on the client factory,
/// so the HTTP layer never depends on the store itself.
pub trait SessionListener: Send + Sync {
    /// The server rejected the session; drop local session state.
    fn session_ended(&self, reason: SessionEnd);
}

/// What to do with a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Return the error to the caller unchanged.
    Propagate,
    /// Drop the session, redirect to login, then return the error.
    EndSession(SessionEnd),
    /// Refresh the token and replay the request.
    Refresh,
}

/// Decide how to handle `failure` for `request` while the user is on
/// `current_path`.
#[must_use]
pub fn classify(
    request: &ApiRequest,
    failure: &ApiError,
    current_path: &str,
    policy: ForbiddenPolicy,
) -> Disposition {
    let ApiError::Status { status, body } = failure else {
        return Disposition::Propagate;
    };

    match *status {
        StatusCode::UNAUTHORIZED if !request.retried => {
            if is_auth_page(current_path) {
                return Disposition::Propagate;
            }
            match &body.code {
                Some(ErrorCode::TokenRefreshRequired) => Disposition::Refresh,
                Some(ErrorCode::AuthenticationRequired) | None if request.quiet => {
                    Disposition::Propagate
                }
                Some(ErrorCode::AuthenticationRequired) | None => {
                    Disposition::EndSession(SessionEnd::Unauthenticated)
                }
                Some(ErrorCode::Other(_)) => Disposition::Propagate,
            }
        }
        StatusCode::FORBIDDEN if request.quiet => Disposition::Propagate,
        StatusCode::FORBIDDEN => match policy {
            ForbiddenPolicy::ClearAndRedirect => Disposition::EndSession(SessionEnd::Forbidden),
            ForbiddenPolicy::Propagate => Disposition::Propagate,
        },
        _ => Disposition::Propagate,
    }
}
