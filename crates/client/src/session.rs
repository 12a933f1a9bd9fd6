//! The session store.
//!
//! Holds the one [`Session`] of a running client. Every mutation replaces
//! the whole snapshot through a `watch` channel, so views that
//! [`subscribe`](SessionStore::subscribe) never see a half-updated session.

use std::sync::Arc;

use shopfront_core::{Role, UserRecord};
use tokio::sync::watch;
use tracing::instrument;

use crate::error::Result;
use crate::http::{SessionEnd, SessionListener};
use crate::navigation::{Navigator, is_auth_page, login_page_for_area, post_login_destination};
use crate::services::{Credentials, UserInfo, UserService};
use crate::telemetry;

/// Authentication state as the UI sees it.
///
/// `is_authenticated` implies `user.is_some()`; the constructors below are
/// the only way the store builds authenticated snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// The signed-in user.
    pub user: Option<UserRecord>,
    /// Whether the backend confirmed a session.
    pub is_authenticated: bool,
    /// A status check or logout is running.
    pub loading: bool,
    /// The backend has been asked (or asking was pointless).
    pub auth_checked: bool,
}

impl Session {
    /// Checked and signed in as `user`.
    #[must_use]
    pub const fn signed_in(user: UserRecord) -> Self {
        Self {
            user: Some(user),
            is_authenticated: true,
            loading: false,
            auth_checked: true,
        }
    }

    /// Checked and signed out.
    #[must_use]
    pub const fn signed_out() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            loading: false,
            auth_checked: true,
        }
    }

    /// Role of the signed-in user, or the guest role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.user
            .as_ref()
            .map_or_else(Role::guest, |user| user.role.clone())
    }
}

/// Owner of the session and the actions that change it.
pub struct SessionStore {
    state: watch::Sender<Session>,
    users: UserService,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &*self.state.borrow())
            .field("users", &self.users)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Unchecked, signed-out store.
    #[must_use]
    pub fn new(users: UserService, navigator: Arc<dyn Navigator>) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            state,
            users,
            navigator,
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receiver that sees every future snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Role of the signed-in user, or the guest role.
    #[must_use]
    pub fn user_role(&self) -> Role {
        self.state.borrow().role()
    }

    /// Record a successful sign-in.
    pub fn login(&self, user: UserRecord) {
        telemetry::set_sentry_user(&user);
        self.state.send_replace(Session::signed_in(user));
    }

    /// Replace the user, keeping the loading flag.
    pub fn set_user(&self, user: UserRecord) {
        telemetry::set_sentry_user(&user);
        self.state.send_modify(|session| {
            session.user = Some(user);
            session.is_authenticated = true;
            session.auth_checked = true;
        });
    }

    /// Drop the user, keeping the loading flag.
    pub fn clear_user(&self) {
        telemetry::clear_sentry_user();
        self.state.send_modify(|session| {
            session.user = None;
            session.is_authenticated = false;
            session.auth_checked = true;
        });
    }

    /// Back to the initial unchecked state, as after a fresh page load.
    pub fn reset_auth_state(&self) {
        telemetry::clear_sentry_user();
        self.state.send_replace(Session::default());
    }

    /// Ask the backend who the session belongs to, once.
    ///
    /// Does nothing while a check is running or after one finished. On an
    /// auth page the session is marked checked without asking. Any failure,
    /// network errors included, leaves the session signed out.
    #[instrument(skip(self))]
    pub async fn check_login_status(&self) {
        let path = self.navigator.current_path();
        let on_auth_page = is_auth_page(&path);

        let started = self.state.send_if_modified(|session| {
            if session.loading || session.auth_checked {
                return false;
            }
            if on_auth_page {
                session.auth_checked = true;
            } else {
                session.loading = true;
            }
            true
        });
        if !started || on_auth_page {
            return;
        }

        let next = match self.users.get_user_info().await {
            Ok(UserInfo::Authenticated(user)) => {
                tracing::debug!(email = %user.email, "Session confirmed");
                telemetry::set_sentry_user(&user);
                Session::signed_in(user)
            }
            Ok(UserInfo::Rejected { message }) => {
                tracing::debug!(%message, "No active session");
                Session::signed_out()
            }
            Err(e) => {
                if e.is_network() {
                    tracing::warn!(error = %e, "Backend unavailable, treating as signed out");
                } else {
                    tracing::info!(error = %e, "Failed to fetch user info");
                }
                Session::signed_out()
            }
        };
        self.state.send_replace(next);
    }

    /// Log out and redirect to the login page of the current area.
    ///
    /// Returns the login page, or `None` if a logout was already running.
    pub async fn logout(&self) -> Option<&'static str> {
        self.logout_with(None::<fn(&str)>).await
    }

    /// Log out, navigating with `navigate` when given and with a full-page
    /// redirect otherwise.
    ///
    /// The backend call may fail; the local session is cleared regardless.
    #[instrument(skip_all)]
    pub async fn logout_with<F: FnOnce(&str)>(&self, navigate: Option<F>) -> Option<&'static str> {
        let started = self.state.send_if_modified(|session| {
            if session.loading {
                return false;
            }
            session.loading = true;
            true
        });
        if !started {
            tracing::debug!("Logout already in progress");
            return None;
        }

        let target = login_page_for_area(&self.navigator.current_path());
        if let Err(e) = self.users.logout().await {
            tracing::warn!(error = %e, "Logout request failed, clearing session anyway");
        }

        telemetry::clear_sentry_user();
        self.state.send_replace(Session::signed_out());
        telemetry::add_breadcrumb("auth", "Signed out");

        match navigate {
            Some(navigate) => navigate(target),
            None => self.navigator.redirect(target),
        }
        Some(target)
    }

    /// Sign in with `credentials`, then move on from the login page.
    ///
    /// Returns the page navigated to.
    ///
    /// # Errors
    ///
    /// Returns the login request error; the session is left unchanged.
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<&'static str> {
        let user = self.users.login(credentials).await?;
        self.login(user);
        telemetry::add_breadcrumb("auth", "Signed in");

        let target = post_login_destination(&self.navigator.current_path());
        self.navigator.redirect(target);
        Ok(target)
    }

    /// The user service the store talks to.
    #[must_use]
    pub const fn users(&self) -> &UserService {
        &self.users
    }
}

impl SessionListener for SessionStore {
    fn session_ended(&self, reason: SessionEnd) {
        match reason {
            SessionEnd::Unauthenticated | SessionEnd::Forbidden => self.clear_user(),
            SessionEnd::RefreshFailed => self.reset_auth_state(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use secrecy::SecretString;
    use serde_json::json;
    use shopfront_core::Email;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::ClientConfig;
    use crate::http::ClientFactory;
    use crate::navigation::MemoryNavigator;

    fn store_at(base: &str, page: &str) -> (SessionStore, Arc<MemoryNavigator>) {
        let base = Url::parse(&format!("{base}/api/")).unwrap();
        let admin = base.join("admin/").unwrap();
        let config = ClientConfig::new(base.clone(), admin);
        let navigator = Arc::new(MemoryNavigator::new(page));
        let factory = ClientFactory::new(&config, navigator.clone()).unwrap();
        let users = UserService::new(factory.build(base));
        (SessionStore::new(users, navigator.clone()), navigator)
    }

    fn user(role: &str) -> UserRecord {
        UserRecord::new(Email::parse("ada@example.com").unwrap(), Role::new(role))
    }

    fn user_json() -> serde_json::Value {
        json!({ "success": true, "user": { "email": "ada@example.com", "role": "ROLE_ADMIN" } })
    }

    #[test]
    fn test_initial_session_is_unchecked_guest() {
        let (store, _) = store_at("http://localhost:1", "/");
        assert_eq!(store.snapshot(), Session::default());
        assert_eq!(store.user_role().as_str(), Role::GUEST);
    }

    #[test]
    fn test_login_and_reset() {
        let (store, _) = store_at("http://localhost:1", "/");
        store.login(user(Role::MANAGER));
        let session = store.snapshot();
        assert!(session.is_authenticated && session.auth_checked && !session.loading);
        assert_eq!(store.user_role().as_str(), Role::MANAGER);

        store.reset_auth_state();
        assert_eq!(store.snapshot(), Session::default());
    }

    #[test]
    fn test_listener_maps_session_ends() {
        let (store, _) = store_at("http://localhost:1", "/");
        store.login(user(Role::USER));
        store.session_ended(SessionEnd::Forbidden);
        assert_eq!(store.snapshot(), Session::signed_out());

        store.login(user(Role::USER));
        store.session_ended(SessionEnd::RefreshFailed);
        assert_eq!(store.snapshot(), Session::default());
    }

    #[tokio::test]
    async fn test_check_login_status_runs_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
            .expect(1)
            .mount(&server)
            .await;

        let (store, _) = store_at(&server.uri(), "/");
        store.check_login_status().await;
        store.check_login_status().await;

        let session = store.snapshot();
        assert!(session.is_authenticated);
        assert_eq!(session.user.unwrap().role.as_str(), Role::ADMIN);
    }

    #[tokio::test]
    async fn test_concurrent_checks_make_one_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(user_json())
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (store, _) = store_at(&server.uri(), "/");
        tokio::join!(store.check_login_status(), store.check_login_status());
        assert!(store.snapshot().is_authenticated);
    }

    #[tokio::test]
    async fn test_check_on_auth_page_skips_backend() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
            .expect(0)
            .mount(&server)
            .await;

        let (store, _) = store_at(&server.uri(), "/adminLogin");
        store.check_login_status().await;
        assert_eq!(store.snapshot(), Session::signed_out());
    }

    #[tokio::test]
    async fn test_network_error_means_signed_out() {
        let (store, navigator) = store_at("http://127.0.0.1:9", "/");
        store.check_login_status().await;
        assert_eq!(store.snapshot(), Session::signed_out());
        assert!(navigator.redirects().is_empty());
    }

    #[tokio::test]
    async fn test_guest_check_stays_on_public_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let (store, navigator) = store_at(&server.uri(), "/");
        store.check_login_status().await;

        assert_eq!(store.snapshot(), Session::signed_out());
        assert!(navigator.redirects().is_empty());
    }

    #[tokio::test]
    async fn test_logout_survives_backend_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let (store, navigator) = store_at(&server.uri(), "/admin/products");
        store.login(user(Role::ADMIN));

        assert_eq!(store.logout().await, Some("/adminLogin"));
        assert_eq!(store.snapshot(), Session::signed_out());
        assert_eq!(navigator.redirects(), ["/adminLogin"]);
    }

    #[tokio::test]
    async fn test_logout_uses_in_app_navigation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let (store, navigator) = store_at(&server.uri(), "/cart");
        store.login(user(Role::USER));

        let visited = Mutex::new(Vec::new());
        let target = store
            .logout_with(Some(|page: &str| visited.lock().unwrap().push(page.to_owned())))
            .await;

        assert_eq!(target, Some("/login"));
        assert_eq!(*visited.lock().unwrap(), ["/login"]);
        assert!(navigator.redirects().is_empty());
    }

    #[tokio::test]
    async fn test_logout_with_rejected_session_navigates_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let (store, navigator) = store_at(&server.uri(), "/cart");
        store.login(user(Role::USER));

        let visited = Mutex::new(Vec::new());
        let target = store
            .logout_with(Some(|page: &str| visited.lock().unwrap().push(page.to_owned())))
            .await;

        assert_eq!(target, Some("/login"));
        assert_eq!(*visited.lock().unwrap(), ["/login"]);
        assert!(navigator.redirects().is_empty());
        assert_eq!(store.snapshot(), Session::signed_out());
    }

    #[tokio::test]
    async fn test_logout_while_loading_is_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (store, _) = store_at(&server.uri(), "/");
        store.state.send_modify(|session| session.loading = true);
        assert_eq!(store.logout().await, None);
        assert!(store.snapshot().loading);
    }

    #[tokio::test]
    async fn test_sign_in_from_admin_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": { "email": "ada@example.com", "role": "ROLE_ADMIN" }
            })))
            .mount(&server)
            .await;

        let (store, navigator) = store_at(&server.uri(), "/adminLogin");
        let credentials = Credentials {
            email: Email::parse("ada@example.com").unwrap(),
            password: SecretString::from("hunter2"),
        };

        assert_eq!(store.sign_in(&credentials).await.unwrap(), "/admin/");
        assert!(store.snapshot().is_authenticated);
        assert_eq!(navigator.redirects(), ["/admin/"]);
    }

    #[tokio::test]
    async fn test_subscribers_see_snapshots() {
        let (store, _) = store_at("http://localhost:1", "/");
        let mut rx = store.subscribe();
        store.login(user(Role::USER));
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_authenticated);
    }
}
