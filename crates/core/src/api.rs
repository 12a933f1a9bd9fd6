//! Wire contract of the REST backend.
//!
//! Success responses come wrapped in small envelopes; failures carry an
//! [`ErrorBody`] whose `code` tells the client whether a token refresh can
//! recover the request.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::UserRecord;

/// Machine-readable failure code sent alongside a 401.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The access token expired; a refresh will recover the session.
    TokenRefreshRequired,
    /// No usable credentials; the user must sign in again.
    AuthenticationRequired,
    /// Any other code, kept verbatim.
    Other(String),
}

impl ErrorCode {
    /// Wire form of [`ErrorCode::TokenRefreshRequired`].
    pub const TOKEN_REFRESH_REQUIRED: &'static str = "TOKEN_REFRESH_REQUIRED";
    /// Wire form of [`ErrorCode::AuthenticationRequired`].
    pub const AUTHENTICATION_REQUIRED: &'static str = "AUTHENTICATION_REQUIRED";

    /// Returns the code as sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::TokenRefreshRequired => Self::TOKEN_REFRESH_REQUIRED,
            Self::AuthenticationRequired => Self::AUTHENTICATION_REQUIRED,
            Self::Other(code) => code,
        }
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        match code {
            Self::TOKEN_REFRESH_REQUIRED => Self::TokenRefreshRequired,
            Self::AUTHENTICATION_REQUIRED => Self::AuthenticationRequired,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(Self::from(code.as_str()))
    }
}

/// Body of a failed response.
///
/// Controllers are not consistent: some send `message`, some `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// Failure code, if any.
    #[serde(default)]
    pub code: Option<ErrorCode>,
    /// Alternative message field.
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Parse a failure body, tolerating empty and non-JSON bodies.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_default()
    }

    /// The best available human-readable message.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().or(self.error.as_deref())
    }
}

/// `GET /user` response.
#[derive(Debug, Clone, Deserialize)]
pub struct UserEnvelope {
    /// Whether the lookup succeeded.
    #[serde(default)]
    pub success: bool,
    /// The signed-in user.
    #[serde(default)]
    pub user: Option<UserRecord>,
    /// Server message.
    #[serde(default)]
    pub message: Option<String>,
}

/// Token metadata returned by a refresh (expiry times and the like).
///
/// The client never interprets it beyond handing it to the caller.
pub type TokenInfo = serde_json::Value;

/// `POST /auth/refresh` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshEnvelope {
    /// Explicit success flag. Some backends omit it on success.
    #[serde(default)]
    pub success: Option<bool>,
    /// The user the rotated token belongs to.
    #[serde(default)]
    pub user: Option<UserRecord>,
    /// Token metadata.
    #[serde(default)]
    pub token_info: Option<TokenInfo>,
    /// Server message.
    #[serde(default)]
    pub message: Option<String>,
    /// Alternative message field.
    #[serde(default)]
    pub error: Option<String>,
}

impl RefreshEnvelope {
    /// A refresh succeeded unless the body says otherwise.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.success != Some(false)
    }
}

/// `POST /login` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginEnvelope {
    /// The signed-in user.
    #[serde(default)]
    pub user: Option<UserRecord>,
    /// Server message.
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /login` request body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    /// Login email.
    pub email: &'a str,
    /// Plain-text password, only ever sent over the wire.
    pub password: &'a str,
}
