//! CLI command implementations.

pub mod catalog;
pub mod session;
pub mod users;

use shopfront_client::ApiError;
use shopfront_core::EmailError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// A request failed.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// The `--email` value is not an email address.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),
}
