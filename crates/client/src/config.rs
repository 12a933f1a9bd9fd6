//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPFRONT_USER_API_URL` - Base URL of the user-facing API (e.g. `http://localhost:8080/api`)
//! - `SHOPFRONT_ADMIN_API_URL` - Base URL of the admin API (e.g. `http://localhost:8080/api/admin`)
//!
//! ## Optional
//! - `SHOPFRONT_REFRESH_TIMEOUT_SECS` - Upper bound for one token refresh (default: 10)
//! - `SHOPFRONT_FORBIDDEN_POLICY` - What a 403 does: `clear` (default) or `propagate`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::http::ForbiddenPolicy;

const DEFAULT_REFRESH_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Shopfront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the user-facing API. Always ends in `/`.
    pub user_api_url: Url,
    /// Base URL of the admin API. Always ends in `/`.
    pub admin_api_url: Url,
    /// How long a token refresh may take before it counts as failed.
    pub refresh_timeout: Duration,
    /// Handling of 403 responses.
    pub forbidden_policy: ForbiddenPolicy,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl ClientConfig {
    /// Configuration with defaults for everything but the two base URLs.
    #[must_use]
    pub fn new(user_api_url: Url, admin_api_url: Url) -> Self {
        Self {
            user_api_url: with_trailing_slash(user_api_url),
            admin_api_url: with_trailing_slash(admin_api_url),
            refresh_timeout: Duration::from_secs(DEFAULT_REFRESH_TIMEOUT_SECS),
            forbidden_policy: ForbiddenPolicy::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Override the refresh timeout.
    #[must_use]
    pub const fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    /// Override the 403 policy.
    #[must_use]
    pub const fn with_forbidden_policy(mut self, policy: ForbiddenPolicy) -> Self {
        self.forbidden_policy = policy;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let user_api_url = get_url("SHOPFRONT_USER_API_URL")?;
        let admin_api_url = get_url("SHOPFRONT_ADMIN_API_URL")?;

        let refresh_timeout = get_env_or_default(
            "SHOPFRONT_REFRESH_TIMEOUT_SECS",
            &DEFAULT_REFRESH_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| {
            ConfigError::InvalidEnvVar("SHOPFRONT_REFRESH_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        let forbidden_policy = get_env_or_default("SHOPFRONT_FORBIDDEN_POLICY", "clear")
            .parse::<ForbiddenPolicy>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHOPFRONT_FORBIDDEN_POLICY".to_string(), e))?;

        Ok(Self {
            refresh_timeout,
            forbidden_policy,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            ..Self::new(user_api_url, admin_api_url)
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as an absolute URL.
fn get_url(key: &str) -> Result<Url, ConfigError> {
    let value = get_required_env(key)?;
    Url::parse(&value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Relative joins against `http://host/api` drop the `api` segment; against
/// `http://host/api/` they keep it.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
