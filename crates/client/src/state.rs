//! Client state shared by every view.

use std::sync::{Arc, Weak};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::{ClientFactory, SessionListener};
use crate::navigation::Navigator;
use crate::services::{ProductService, UserService};
use crate::session::SessionStore;

/// Everything a running storefront or back office needs.
///
/// This struct is cheaply cloneable via `Arc`. Building it wires the
/// session store into the HTTP layer as its session listener.
#[derive(Clone)]
pub struct ShopState {
    inner: Arc<ShopStateInner>,
}

struct ShopStateInner {
    config: ClientConfig,
    factory: ClientFactory,
    session: Arc<SessionStore>,
    users: UserService,
    products: ProductService,
    admin_users: UserService,
    admin_products: ProductService,
}

impl ShopState {
    /// Create the clients, services and session store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ClientConfig, navigator: Arc<dyn Navigator>) -> Result<Self> {
        let factory = ClientFactory::new(&config, Arc::clone(&navigator))?;
        let user_api = factory.build(config.user_api_url.clone());
        let admin_api = factory.build(config.admin_api_url.clone());

        let users = UserService::new(user_api.clone());
        let session = Arc::new(SessionStore::new(users.clone(), navigator));
        let listener: Weak<SessionStore> = Arc::downgrade(&session);
        factory.set_session_listener(listener as Weak<dyn SessionListener>);

        Ok(Self {
            inner: Arc::new(ShopStateInner {
                config,
                factory,
                session,
                users,
                products: ProductService::new(user_api),
                admin_users: UserService::new(admin_api.clone()),
                admin_products: ProductService::new(admin_api),
            }),
        })
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Get a reference to the client factory.
    #[must_use]
    pub fn factory(&self) -> &ClientFactory {
        &self.inner.factory
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.inner.session
    }

    /// User service over the user-facing API.
    #[must_use]
    pub fn users(&self) -> &UserService {
        &self.inner.users
    }

    /// Product service over the user-facing API.
    #[must_use]
    pub fn products(&self) -> &ProductService {
        &self.inner.products
    }

    /// User service over the admin API.
    #[must_use]
    pub fn admin_users(&self) -> &UserService {
        &self.inner.admin_users
    }

    /// Product service over the admin API.
    #[must_use]
    pub fn admin_products(&self) -> &ProductService {
        &self.inner.admin_products
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::navigation::MemoryNavigator;
    use crate::session::Session;

    #[tokio::test]
    async fn test_unauthenticated_response_clears_wired_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/users"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "code": "AUTHENTICATION_REQUIRED" })),
            )
            .mount(&server)
            .await;

        let config = ClientConfig::new(
            Url::parse(&format!("{}/api", server.uri())).unwrap(),
            Url::parse(&format!("{}/api/admin", server.uri())).unwrap(),
        );
        let navigator = Arc::new(MemoryNavigator::new("/admin/users"));
        let state = ShopState::new(config, navigator.clone()).unwrap();
        state.session().login(shopfront_core::UserRecord::new(
            shopfront_core::Email::parse("ada@example.com").unwrap(),
            shopfront_core::Role::new(shopfront_core::Role::ADMIN),
        ));

        assert!(state.admin_users().get_all_users().await.is_err());
        assert_eq!(state.session().snapshot(), Session::signed_out());
        assert_eq!(navigator.redirects(), ["/adminLogin"]);
    }
}
