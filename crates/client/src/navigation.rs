//! Page navigation.
//!
//! The HTTP layer and the session store need to know which page the user is
//! on and to send them to a login page. [`Navigator`] abstracts the browser
//! location; [`MemoryNavigator`] keeps it in memory for the CLI and tests.

use std::sync::{Mutex, PoisonError};

/// Shopper login page.
pub const LOGIN_PAGE: &str = "/login";
/// Back-office login page.
pub const ADMIN_LOGIN_PAGE: &str = "/adminLogin";
/// Registration page.
pub const REGISTER_PAGE: &str = "/register";
/// Root of every back-office route.
pub const ADMIN_ROOT: &str = "/admin";
/// Storefront home.
pub const HOME_PAGE: &str = "/";
/// Back-office home.
pub const ADMIN_HOME: &str = "/admin/";

/// Access to the current location and full-page redirects.
pub trait Navigator: Send + Sync {
    /// Path of the page currently shown.
    fn current_path(&self) -> String;

    /// Leave the current page for `target` (full-page load).
    fn redirect(&self, target: &str);
}

/// Pages where an auth failure must not trigger a redirect or refresh.
#[must_use]
pub fn is_auth_page(path: &str) -> bool {
    matches!(path, LOGIN_PAGE | ADMIN_LOGIN_PAGE | REGISTER_PAGE)
}

/// Whether `path` belongs to the back office (including its login page).
#[must_use]
pub fn is_admin_area(path: &str) -> bool {
    path.starts_with(ADMIN_ROOT) || path == ADMIN_LOGIN_PAGE
}

/// Login page to send the user to after a failed request.
///
/// Admin login when the request targeted the admin API or the user is in
/// the back office; shopper login otherwise.
#[must_use]
pub fn login_page_for(request_url: &str, current_path: &str, admin_base: &str) -> &'static str {
    let admin_base = admin_base.trim_end_matches('/');
    let admin_request = request_url.contains("/admin")
        || (!admin_base.is_empty() && request_url.contains(admin_base));

    if admin_request || is_admin_area(current_path) {
        ADMIN_LOGIN_PAGE
    } else {
        LOGIN_PAGE
    }
}

/// Login page matching the area the user is in.
#[must_use]
pub fn login_page_for_area(current_path: &str) -> &'static str {
    if is_admin_area(current_path) {
        ADMIN_LOGIN_PAGE
    } else {
        LOGIN_PAGE
    }
}

/// Where to go after a successful sign-in from `current_path`.
#[must_use]
pub fn post_login_destination(current_path: &str) -> &'static str {
    if current_path == ADMIN_LOGIN_PAGE {
        ADMIN_HOME
    } else {
        HOME_PAGE
    }
}

/// In-memory [`Navigator`] recording every redirect.
#[derive(Debug)]
pub struct MemoryNavigator {
    state: Mutex<NavigatorState>,
}

#[derive(Debug)]
struct NavigatorState {
    path: String,
    redirects: Vec<String>,
}

impl MemoryNavigator {
    /// Start on `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(NavigatorState {
                path: path.into(),
                redirects: Vec::new(),
            }),
        }
    }

    /// Move to `path` without recording a redirect (in-app navigation).
    pub fn visit(&self, path: impl Into<String>) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .path = path.into();
    }

    /// Every redirect issued so far, oldest first.
    #[must_use]
    pub fn redirects(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .redirects
            .clone()
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .path
            .clone()
    }

    fn redirect(&self, target: &str) {
        tracing::info!(target, "Redirecting");
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.path = target.to_owned();
        state.redirects.push(target.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN_BASE: &str = "http://localhost:8080/api/admin/";

    #[test]
    fn test_auth_pages_are_exact_matches() {
        assert!(is_auth_page("/login"));
        assert!(is_auth_page("/adminLogin"));
        assert!(is_auth_page("/register"));
        assert!(!is_auth_page("/login/help"));
        assert!(!is_auth_page("/"));
    }

    #[test]
    fn test_admin_request_url_selects_admin_login() {
        assert_eq!(
            login_page_for("http://localhost:8080/api/admin/product", "/", ADMIN_BASE),
            ADMIN_LOGIN_PAGE
        );
    }

    #[test]
    fn test_admin_area_selects_admin_login() {
        assert_eq!(
            login_page_for("http://localhost:8080/api/user", "/admin/products", ADMIN_BASE),
            ADMIN_LOGIN_PAGE
        );
        assert_eq!(
            login_page_for("http://localhost:8080/api/user", "/adminLogin", ADMIN_BASE),
            ADMIN_LOGIN_PAGE
        );
    }

    #[test]
    fn test_admin_base_on_other_host_selects_admin_login() {
        assert_eq!(
            login_page_for("https://back.office.test/v1/users", "/", "https://back.office.test/v1/"),
            ADMIN_LOGIN_PAGE
        );
    }

    #[test]
    fn test_storefront_selects_user_login() {
        assert_eq!(
            login_page_for("http://localhost:8080/api/product/3", "/product/3", ADMIN_BASE),
            LOGIN_PAGE
        );
    }

    #[test]
    fn test_post_login_destination() {
        assert_eq!(post_login_destination("/adminLogin"), ADMIN_HOME);
        assert_eq!(post_login_destination("/login"), HOME_PAGE);
    }

    #[test]
    fn test_memory_navigator_records_redirects() {
        let nav = MemoryNavigator::new("/search");
        nav.visit("/product/1");
        assert!(nav.redirects().is_empty());

        nav.redirect(LOGIN_PAGE);
        assert_eq!(nav.current_path(), LOGIN_PAGE);
        assert_eq!(nav.redirects(), [LOGIN_PAGE]);
    }
}
