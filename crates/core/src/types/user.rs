//! User records as returned by the backend.

use serde::{Deserialize, Serialize};

use super::{Email, Role, UserId};

/// A user as the backend describes it.
///
/// `GET /user` returns the full record; `POST /auth/refresh` only returns
/// `email` and `role`, so everything else is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Database ID (absent in refresh responses).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    /// Login email.
    pub email: Email,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Contact phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Role tag checked by the admin route guard.
    pub role: Role,
}

impl UserRecord {
    /// Minimal record with only the fields every endpoint returns.
    #[must_use]
    pub const fn new(email: Email, role: Role) -> Self {
        Self {
            id: None,
            email,
            username: None,
            phone_number: None,
            role,
        }
    }
}
