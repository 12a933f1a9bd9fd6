//! Session commands.
//!
//! # Usage
//!
//! ```bash
//! shop-cli whoami
//! shop-cli --email ada@example.com --path /login whoami
//! shop-cli --path /admin/products logout
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPFRONT_PASSWORD` - Password used with `--email`

use secrecy::SecretString;
use shopfront_client::ShopState;
use shopfront_client::services::Credentials;
use shopfront_core::Email;

use super::CliError;

/// Sign in with `email` and the password from `SHOPFRONT_PASSWORD`.
pub async fn sign_in(state: &ShopState, email: &str) -> Result<(), CliError> {
    let email = Email::parse(email)?;
    let password = std::env::var("SHOPFRONT_PASSWORD")
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("SHOPFRONT_PASSWORD"))?;

    let target = state
        .session()
        .sign_in(&Credentials { email, password })
        .await?;
    tracing::info!("Signed in, continuing at {target}");
    Ok(())
}

/// Check the session and print it.
pub async fn whoami(state: &ShopState) {
    let session = state.session();
    session.check_login_status().await;

    let snapshot = session.snapshot();
    match snapshot.user.as_ref() {
        Some(user) if snapshot.is_authenticated => {
            tracing::info!("Signed in as {} ({})", user.email, user.role);
            if let Some(username) = &user.username {
                tracing::info!("  Username: {username}");
            }
        }
        _ => tracing::info!("Not signed in (role {})", session.user_role()),
    }
}

/// End the session.
pub async fn logout(state: &ShopState) {
    match state.session().logout().await {
        Some(target) => tracing::info!("Signed out, redirected to {target}"),
        None => tracing::warn!("A logout is already in progress"),
    }
}
