//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod role;
pub mod user;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use role::{ADMIN_ROLES, Role};
pub use user::UserRecord;
