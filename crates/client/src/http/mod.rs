//! Cookie-authenticated HTTP clients.
//!
//! A [`ClientFactory`] owns everything the clients it builds share: the
//! cookie jar, the [`RefreshGate`], the [`Navigator`] and the session
//! listener slot. Each [`ApiClient`] is bound to one base URL and runs every
//! call through content-type negotiation on the way out and the auth
//! interceptor on the way back.

mod interceptor;
mod payload;
mod refresh;

use std::sync::{Arc, PoisonError, RwLock, Weak};
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use shopfront_core::api::{ErrorBody, RefreshEnvelope};
use tracing::instrument;
use url::Url;

pub use interceptor::{Disposition, ForbiddenPolicy, SessionEnd, SessionListener, classify};
pub use payload::{FormPart, MultipartForm, Payload, negotiate_content_type};
pub use refresh::{LeaderGuard, RefreshGate, RefreshResult, Ticket, Waiter};

use crate::config::ClientConfig;
use crate::error::{ApiError, RefreshFailure, Result};
use crate::navigation::{Navigator, is_auth_page, login_page_for};

/// Path of the token refresh endpoint, relative to a client's base URL.
pub const REFRESH_PATH: &str = "auth/refresh";

/// Builds [`ApiClient`]s that share cookies and refresh state.
#[derive(Clone)]
pub struct ClientFactory {
    inner: Arc<FactoryInner>,
}

struct FactoryInner {
    http: reqwest::Client,
    gate: RefreshGate,
    navigator: Arc<dyn Navigator>,
    forbidden_policy: ForbiddenPolicy,
    refresh_timeout: Duration,
    admin_base: Url,
    listener: RwLock<Option<Weak<dyn SessionListener>>>,
}

impl ClientFactory {
    /// Create a factory with a fresh cookie jar and refresh gate.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the HTTP client cannot be created.
    pub fn new(config: &ClientConfig, navigator: Arc<dyn Navigator>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .cookie_provider(Arc::new(Jar::default()))
            .build()?;

        Ok(Self {
            inner: Arc::new(FactoryInner {
                http,
                gate: RefreshGate::new(),
                navigator,
                forbidden_policy: config.forbidden_policy,
                refresh_timeout: config.refresh_timeout,
                admin_base: config.admin_api_url.clone(),
                listener: RwLock::new(None),
            }),
        })
    }

    /// Client for the API rooted at `base_url`.
    #[must_use]
    pub fn build(&self, base_url: Url) -> ApiClient {
        ApiClient {
            base_url,
            inner: Arc::clone(&self.inner),
        }
    }

    /// Register the receiver of session-ending events.
    ///
    /// Held weakly: the listener usually owns a client built here.
    pub fn set_session_listener(&self, listener: Weak<dyn SessionListener>) {
        *self
            .inner
            .listener
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(listener);
    }

    /// The refresh gate shared by every client of this factory.
    #[must_use]
    pub fn gate(&self) -> &RefreshGate {
        &self.inner.gate
    }

    /// The navigator used for redirects.
    #[must_use]
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.inner.navigator
    }
}

impl std::fmt::Debug for ClientFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientFactory")
            .field("forbidden_policy", &self.inner.forbidden_policy)
            .field("refresh_timeout", &self.inner.refresh_timeout)
            .field("admin_base", &self.inner.admin_base.as_str())
            .finish_non_exhaustive()
    }
}

/// A request as seen by the interceptors.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: Url,
    /// Body.
    pub payload: Payload,
    /// Set once the request has been replayed after a refresh.
    pub retried: bool,
    /// The caller handles auth failures itself: a 401 or 403 never ends
    /// the session or redirects. Expired tokens are still refreshed.
    pub quiet: bool,
}

impl ApiRequest {
    /// A request that has not been retried.
    #[must_use]
    pub const fn new(method: Method, url: Url, payload: Payload) -> Self {
        Self {
            method,
            url,
            payload,
            retried: false,
            quiet: false,
        }
    }

    /// Mark the request as quiet.
    #[must_use]
    pub const fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }
}

/// A successful response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Response status (always 2xx).
    pub status: StatusCode,
    /// Raw body.
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Json` if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

enum Intercepted {
    Fail(ApiError),
    Refresh(ApiError),
}

/// HTTP client bound to one base URL.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    inner: Arc<FactoryInner>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Base URL every path is resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` against the base URL.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Url` if the result is not a valid URL.
    pub fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// `GET path`.
    ///
    /// # Errors
    ///
    /// Returns the error left after interception.
    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send(Method::GET, path, Payload::Empty).await
    }

    /// `POST path`.
    ///
    /// # Errors
    ///
    /// Returns the error left after interception.
    pub async fn post(&self, path: &str, payload: Payload) -> Result<ApiResponse> {
        self.send(Method::POST, path, payload).await
    }

    /// `PUT path`.
    ///
    /// # Errors
    ///
    /// Returns the error left after interception.
    pub async fn put(&self, path: &str, payload: Payload) -> Result<ApiResponse> {
        self.send(Method::PUT, path, payload).await
    }

    /// `DELETE path`.
    ///
    /// # Errors
    ///
    /// Returns the error left after interception.
    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.send(Method::DELETE, path, Payload::Empty).await
    }

    /// `GET path`, decoding the body as `T`.
    ///
    /// # Errors
    ///
    /// Returns the error left after interception, or `ApiError::Json`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get(path).await?.json()
    }

    /// `POST path`, decoding the body as `T`.
    ///
    /// # Errors
    ///
    /// Returns the error left after interception, or `ApiError::Json`.
    pub async fn post_json<T: DeserializeOwned>(&self, path: &str, payload: Payload) -> Result<T> {
        self.post(path, payload).await?.json()
    }

    /// `PUT path`, decoding the body as `T`.
    ///
    /// # Errors
    ///
    /// Returns the error left after interception, or `ApiError::Json`.
    pub async fn put_json<T: DeserializeOwned>(&self, path: &str, payload: Payload) -> Result<T> {
        self.put(path, payload).await?.json()
    }

    /// `DELETE path`, decoding the body as `T`.
    ///
    /// # Errors
    ///
    /// Returns the error left after interception, or `ApiError::Json`.
    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.delete(path).await?.json()
    }

    /// Send a request through both interceptors.
    ///
    /// # Errors
    ///
    /// Returns the error left after interception: the original failure, or
    /// `ApiError::RefreshFailed` when a required refresh did not succeed.
    pub async fn send(&self, method: Method, path: &str, payload: Payload) -> Result<ApiResponse> {
        let request = ApiRequest::new(method, self.url(path)?, payload);
        self.execute(request).await
    }

    /// Send a request whose auth failures the caller handles itself.
    ///
    /// Used for session checks and logout: a rejected session comes back as
    /// an error without clearing anything or leaving the page.
    ///
    /// # Errors
    ///
    /// Returns the error left after interception.
    pub async fn send_quiet(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
    ) -> Result<ApiResponse> {
        let request = ApiRequest::new(method, self.url(path)?, payload).quiet();
        self.execute(request).await
    }

    /// Run `request` through the auth interceptor.
    #[instrument(
        skip(self, request),
        fields(method = %request.method, url = %request.url, quiet = request.quiet)
    )]
    async fn execute(&self, mut request: ApiRequest) -> Result<ApiResponse> {
        let failure = match self.dispatch(&request).await {
            Ok(response) => return Ok(response),
            Err(failure) => failure,
        };

        match self.intercept(&request, failure) {
            Intercepted::Fail(err) => Err(err),
            Intercepted::Refresh(_) => {
                request.retried = true;
                self.refresh_session(&request).await?;
                self.dispatch(&request)
                    .await
                    .or_else(|failure| match self.intercept(&request, failure) {
                        Intercepted::Fail(err) | Intercepted::Refresh(err) => Err(err),
                    })
            }
        }
    }

    /// Apply the failure disposition's side effects.
    fn intercept(&self, request: &ApiRequest, failure: ApiError) -> Intercepted {
        let current_path = self.inner.navigator.current_path();
        match classify(
            request,
            &failure,
            &current_path,
            self.inner.forbidden_policy,
        ) {
            Disposition::Propagate => Intercepted::Fail(failure),
            Disposition::Refresh => Intercepted::Refresh(failure),
            Disposition::EndSession(reason) => {
                tracing::info!(%reason, status = ?failure.status(), "Ending session");
                self.end_session(reason, request, &current_path);
                Intercepted::Fail(failure)
            }
        }
    }

    /// Wait for or perform the token refresh the request needs.
    async fn refresh_session(&self, request: &ApiRequest) -> Result<()> {
        match self.inner.gate.acquire() {
            Ticket::Follower(waiter) => Ok(waiter.wait().await?),
            Ticket::Leader(guard) => {
                let outcome = self.call_refresh().await;
                guard.release(&outcome);
                if let Err(failure) = outcome {
                    tracing::warn!(error = %failure, "Token refresh failed");
                    let current_path = self.inner.navigator.current_path();
                    self.end_session(SessionEnd::RefreshFailed, request, &current_path);
                    return Err(failure.into());
                }
                tracing::debug!("Token refreshed");
                Ok(())
            }
        }
    }

    /// `POST auth/refresh`, bypassing interception and bounded by the
    /// refresh timeout.
    async fn call_refresh(&self) -> RefreshResult {
        let url = self
            .url(REFRESH_PATH)
            .map_err(|e| RefreshFailure::Transport(e.to_string()))?;
        let request = ApiRequest::new(Method::POST, url, Payload::Empty);
        let timeout = self.inner.refresh_timeout;

        let response = tokio::time::timeout(timeout, self.dispatch(&request))
            .await
            .map_err(|_| RefreshFailure::TimedOut(timeout))?
            .map_err(|err| match err {
                ApiError::Status { status, body } => RefreshFailure::Rejected {
                    status,
                    message: body
                        .message()
                        .or_else(|| status.canonical_reason())
                        .unwrap_or_default()
                        .to_owned(),
                },
                other => RefreshFailure::Transport(other.to_string()),
            })?;

        match response.json::<RefreshEnvelope>() {
            Ok(envelope) if !envelope.succeeded() => Err(RefreshFailure::Rejected {
                status: response.status,
                message: envelope
                    .message
                    .or(envelope.error)
                    .unwrap_or_else(|| "refresh reported failure".to_owned()),
            }),
            _ => Ok(()),
        }
    }

    /// Notify the session listener and send the user to the right login page.
    ///
    /// Quiet requests and requests made from an auth page never redirect.
    fn end_session(&self, reason: SessionEnd, request: &ApiRequest, current_path: &str) {
        let listener = self
            .inner
            .listener
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(Weak::upgrade);
        if let Some(listener) = listener {
            listener.session_ended(reason);
        }

        if request.quiet || is_auth_page(current_path) {
            return;
        }
        let target = login_page_for(
            request.url.as_str(),
            current_path,
            self.inner.admin_base.as_str(),
        );
        self.inner.navigator.redirect(target);
    }

    /// Send one attempt without interception.
    async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut headers = HeaderMap::new();
        negotiate_content_type(&request.payload, &mut headers);

        let builder = self
            .inner
            .http
            .request(request.method.clone(), request.url.clone())
            .headers(headers);
        let response = request.payload.apply(builder)?.send().await?;

        let status = response.status();
        let body = response.bytes().await?.to_vec();

        if status.is_success() {
            Ok(ApiResponse { status, body })
        } else {
            Err(ApiError::Status {
                status,
                body: ErrorBody::from_bytes(&body),
            })
        }
    }
}
