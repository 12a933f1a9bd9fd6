//! Authorization role tags.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A role tag as issued by the backend (`ROLE_ADMIN`, `ROLE_USER`, ...).
///
/// Roles are compared as opaque strings: the backend owns the hierarchy
/// (`ROLE_ADMIN > ROLE_MANAGER > ROLE_USER`), the client only checks
/// membership in a required set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// Full administrative access.
    pub const ADMIN: &'static str = "ROLE_ADMIN";
    /// Store management access.
    pub const MANAGER: &'static str = "ROLE_MANAGER";
    /// Regular shopper.
    pub const USER: &'static str = "ROLE_USER";
    /// Role reported for a visitor without a session.
    pub const GUEST: &'static str = "ROLE_GUEST";

    /// Create a role from its tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The role assumed when no user is signed in.
    #[must_use]
    pub fn guest() -> Self {
        Self(Self::GUEST.to_owned())
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this role appears in `required`.
    #[must_use]
    pub fn is_any_of(&self, required: &[&str]) -> bool {
        required.iter().any(|tag| *tag == self.0)
    }
}

/// Roles allowed into the admin back office.
pub const ADMIN_ROLES: &[&str] = &[Role::ADMIN, Role::MANAGER];

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(tag: &str) -> Self {
        Self(tag.to_owned())
    }
}
