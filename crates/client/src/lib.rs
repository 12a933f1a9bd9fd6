//! Shopfront client library.
//!
//! Cookie-authenticated access to the storefront and admin REST APIs:
//! - [`http`] - client factory, content-type negotiation, the auth
//!   interceptor and single-flight token refresh
//! - [`session`] - the session store
//! - [`guard`] - the admin route guard
//! - [`services`] - user and product services
//! - [`state`] - wiring of all of the above

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod navigation;
pub mod services;
pub mod session;
pub mod state;
pub mod telemetry;

pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, RefreshFailure, Result};
pub use state::ShopState;
