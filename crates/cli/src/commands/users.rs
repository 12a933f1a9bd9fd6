//! User management commands (admin API).

use shopfront_client::ShopState;

use super::CliError;

/// List every user.
pub async fn list(state: &ShopState) -> Result<(), CliError> {
    let users = state.admin_users().get_all_users().await?;

    tracing::info!("{} users", users.len());
    for user in &users {
        let id = user
            .id
            .map_or_else(|| "-".to_owned(), |id| id.to_string());
        tracing::info!(
            "  {id:>6}  {:<32}  {:<14}  {}",
            user.email,
            user.role,
            user.username.as_deref().unwrap_or_default()
        );
    }
    Ok(())
}
