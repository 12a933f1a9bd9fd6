//! Integration tests for the Shopfront client.
//!
//! Every test runs a full [`ShopState`] against a `wiremock` server standing
//! in for the REST backend, so the auth pipeline is exercised end to end:
//! content-type negotiation, the auth interceptor, the refresh gate and the
//! session store.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```

use std::sync::Arc;

use serde_json::{Value, json};
use shopfront_client::navigation::MemoryNavigator;
use shopfront_client::{ClientConfig, ShopState};
use url::Url;
use wiremock::{MockServer, ResponseTemplate};

/// A wired client state talking to a mock backend.
pub struct TestContext {
    /// The mock backend. User API under `/api/`, admin API under `/api/admin/`.
    pub server: MockServer,
    /// Records every redirect the client issues.
    pub navigator: Arc<MemoryNavigator>,
    /// The client under test.
    pub state: ShopState,
}

impl TestContext {
    /// Context with default configuration, starting on page `path`.
    pub async fn new(path: &str) -> Self {
        Self::with_config(path, |config| config).await
    }

    /// Context whose configuration is adjusted by `configure`.
    ///
    /// # Panics
    ///
    /// Panics if the client state cannot be built.
    pub async fn with_config(
        path: &str,
        configure: impl FnOnce(ClientConfig) -> ClientConfig,
    ) -> Self {
        let server = MockServer::start().await;
        let config = configure(ClientConfig::new(
            Url::parse(&format!("{}/api", server.uri())).expect("valid user API URL"),
            Url::parse(&format!("{}/api/admin", server.uri())).expect("valid admin API URL"),
        ));
        let navigator = Arc::new(MemoryNavigator::new(path));
        let state = ShopState::new(config, navigator.clone()).expect("Failed to build client state");

        Self {
            server,
            navigator,
            state,
        }
    }

    /// Number of requests the backend received for `path`.
    ///
    /// # Panics
    ///
    /// Panics if request recording is disabled on the mock server.
    pub async fn hits(&self, path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .expect("request recording enabled")
            .iter()
            .filter(|request| request.url.path() == path)
            .count()
    }
}

/// 401 asking for a token refresh.
#[must_use]
pub fn refresh_required() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({
        "message": "Access token expired",
        "code": "TOKEN_REFRESH_REQUIRED"
    }))
}

/// 401 asking for a new login.
#[must_use]
pub fn authentication_required() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({
        "message": "Login required",
        "code": "AUTHENTICATION_REQUIRED"
    }))
}

/// `GET /user` body for a signed-in user with `role`.
#[must_use]
pub fn user_body(role: &str) -> Value {
    json!({
        "success": true,
        "user": { "id": 1, "email": "ada@example.com", "username": "ada", "role": role }
    })
}
