//! User accounts and authentication endpoints.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use shopfront_core::api::{LoginEnvelope, LoginRequest, RefreshEnvelope, TokenInfo, UserEnvelope};
use shopfront_core::{Email, UserId, UserRecord};
use tracing::instrument;

use crate::error::{ApiError, Result};
use crate::http::{ApiClient, Payload};

/// Email and password for `POST /login`.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Login email.
    pub email: Email,
    /// Password, only exposed when the request body is built.
    pub password: SecretString,
}

/// Answer of `GET /user`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInfo {
    /// The session belongs to this user.
    Authenticated(UserRecord),
    /// The server answered but did not confirm a user.
    Rejected {
        /// Server message, or a generic one.
        message: String,
    },
}

/// Answer of an explicit `POST /auth/refresh`.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The token was rotated.
    Refreshed {
        /// User the new token belongs to.
        user: Option<UserRecord>,
        /// Token metadata such as expiry times.
        token_info: Option<TokenInfo>,
    },
    /// The refresh did not go through.
    Failed {
        /// Server message, or a generic one.
        message: String,
    },
}

/// User API service.
#[derive(Debug, Clone)]
pub struct UserService {
    client: ApiClient,
}

impl UserService {
    /// Service over `client` (the user-facing or admin API).
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// The underlying client.
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// `GET /users`.
    ///
    /// # Errors
    ///
    /// Returns the request error.
    #[instrument(skip(self))]
    pub async fn get_all_users(&self) -> Result<Vec<UserRecord>> {
        self.client
            .get_json("users")
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to retrieve users"))
    }

    /// `GET /user`: who the current session belongs to.
    ///
    /// Sent quietly: a guest's 401 is an answer here, so it neither ends
    /// the session nor leaves the page.
    ///
    /// # Errors
    ///
    /// Returns the request error (including 401s the interceptor did not
    /// recover from).
    #[instrument(skip(self))]
    pub async fn get_user_info(&self) -> Result<UserInfo> {
        let envelope: UserEnvelope = self
            .client
            .send_quiet(Method::GET, "user", Payload::Empty)
            .await
            .and_then(|response| response.json())
            .inspect_err(|e| tracing::debug!(error = %e, "Failed to get user info"))?;

        Ok(match envelope {
            UserEnvelope {
                success: true,
                user: Some(user),
                ..
            } => UserInfo::Authenticated(user),
            UserEnvelope { message, .. } => UserInfo::Rejected {
                message: message.unwrap_or_else(|| "Failed to get user info".to_owned()),
            },
        })
    }

    /// `GET /user/{id}`.
    ///
    /// # Errors
    ///
    /// Returns the request error.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get_user_by_id(&self, id: UserId) -> Result<UserRecord> {
        self.client
            .get_json(&format!("user/{id}"))
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to retrieve user"))
    }

    /// `GET /user/{email}`.
    ///
    /// # Errors
    ///
    /// Returns the request error.
    #[instrument(skip(self, email), fields(email = %email))]
    pub async fn get_user_by_email(&self, email: &Email) -> Result<UserRecord> {
        self.client
            .get_json(&format!("user/{email}"))
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to retrieve user by email"))
    }

    /// `POST /user`.
    ///
    /// # Errors
    ///
    /// Returns the request error.
    #[instrument(skip_all)]
    pub async fn create_user<T: Serialize + ?Sized + Sync>(&self, user: &T) -> Result<UserRecord> {
        self.client
            .post_json("user", Payload::json(user)?)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to create user"))
    }

    /// `PUT /user/{id}`.
    ///
    /// # Errors
    ///
    /// Returns the request error.
    #[instrument(skip(self, update), fields(user_id = %id))]
    pub async fn update_user<T: Serialize + ?Sized + Sync>(
        &self,
        id: UserId,
        update: &T,
    ) -> Result<UserRecord> {
        self.client
            .put_json(&format!("user/{id}"), Payload::json(update)?)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to update user"))
    }

    /// `DELETE /user/{id}`. Returns `true` once the server accepted it.
    ///
    /// # Errors
    ///
    /// Returns the request error.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: UserId) -> Result<bool> {
        self.client
            .delete(&format!("user/{id}"))
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to delete user"))?;
        Ok(true)
    }

    /// `POST /auth/refresh`, reporting failure as a value.
    #[instrument(skip(self))]
    pub async fn refresh_access_token(&self) -> RefreshOutcome {
        match self
            .client
            .post_json::<RefreshEnvelope>("auth/refresh", Payload::Empty)
            .await
        {
            Ok(envelope) if envelope.succeeded() => RefreshOutcome::Refreshed {
                user: envelope.user,
                token_info: envelope.token_info,
            },
            Ok(envelope) => RefreshOutcome::Failed {
                message: envelope
                    .message
                    .or(envelope.error)
                    .unwrap_or_else(|| "Token refresh failed".to_owned()),
            },
            Err(e) => {
                tracing::error!(error = %e, "Token refresh error");
                RefreshOutcome::Failed {
                    message: e
                        .server_message()
                        .unwrap_or("Token refresh failed")
                        .to_owned(),
                }
            }
        }
    }

    /// `POST /login`.
    ///
    /// # Errors
    ///
    /// Returns the request error, or `ApiError::Rejected` when the server
    /// answers without a user.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<UserRecord> {
        let request = LoginRequest {
            email: credentials.email.as_str(),
            password: credentials.password.expose_secret(),
        };
        let envelope: LoginEnvelope = self
            .client
            .post_json("login", Payload::json(&request)?)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Login failed"))?;

        envelope.user.ok_or_else(|| {
            ApiError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| "login response carried no user".to_owned()),
            )
        })
    }

    /// `POST /auth/logout`, sent quietly so the caller decides where to go.
    ///
    /// # Errors
    ///
    /// Returns the request error.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        self.client
            .send_quiet(Method::POST, "auth/logout", Payload::Empty)
            .await?;
        Ok(())
    }
}
