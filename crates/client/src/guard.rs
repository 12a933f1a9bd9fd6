//! Admin route guard.

use std::sync::atomic::{AtomicBool, Ordering};

use shopfront_core::Role;

use crate::navigation::ADMIN_LOGIN_PAGE;
use crate::session::Session;

/// What the guard looks at.
#[derive(Debug, Clone, Copy)]
pub struct GuardInput<'a> {
    /// Whether the session check has finished.
    pub auth_checked: bool,
    /// Whether the session is authenticated.
    pub is_authenticated: bool,
    /// Role of the current user (guest when signed out).
    pub user_role: &'a str,
    /// Roles allowed through, or `None` for any authenticated user.
    pub required_roles: Option<&'a [&'a str]>,
}

impl<'a> GuardInput<'a> {
    /// Input for `session` and `role` (usually [`Session::role`]).
    #[must_use]
    pub fn from_session(
        session: &Session,
        role: &'a Role,
        required_roles: Option<&'a [&'a str]>,
    ) -> Self {
        Self {
            auth_checked: session.auth_checked,
            is_authenticated: session.is_authenticated,
            user_role: role.as_str(),
            required_roles,
        }
    }
}

/// Outcome of one guard evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session not checked yet: render nothing and do not redirect.
    Pending,
    /// Not signed in: go to this page.
    Redirect(&'static str),
    /// Signed in without a required role: render nothing.
    Denied,
    /// Render the protected page.
    Render,
}

type ForcedLogout = Box<dyn Fn() + Send + Sync>;

/// Gate for admin routes.
///
/// An optional forced-logout callback runs once when a signed-in user
/// lacks the required role. Re-evaluating the same violation does not run
/// it again; any other outcome re-arms it.
#[derive(Default)]
pub struct RouteGuard {
    forced_logout: Option<ForcedLogout>,
    fired: AtomicBool,
}

impl std::fmt::Debug for RouteGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteGuard")
            .field("forced_logout", &self.forced_logout.is_some())
            .field("fired", &self.fired.load(Ordering::Relaxed))
            .finish()
    }
}

impl RouteGuard {
    /// Guard without a forced-logout callback.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Guard that calls `forced_logout` on a role violation.
    #[must_use]
    pub fn with_forced_logout(forced_logout: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            forced_logout: Some(Box::new(forced_logout)),
            fired: AtomicBool::new(false),
        }
    }

    /// Decide what the guarded route shows.
    pub fn evaluate(&self, input: GuardInput<'_>) -> GuardDecision {
        let decision = if !input.auth_checked {
            GuardDecision::Pending
        } else if !input.is_authenticated {
            GuardDecision::Redirect(ADMIN_LOGIN_PAGE)
        } else if input
            .required_roles
            .is_some_and(|roles| !roles.contains(&input.user_role))
        {
            GuardDecision::Denied
        } else {
            GuardDecision::Render
        };

        if decision == GuardDecision::Denied {
            if !self.fired.swap(true, Ordering::AcqRel) {
                tracing::warn!(role = input.user_role, "Insufficient role for admin route");
                if let Some(forced_logout) = &self.forced_logout {
                    forced_logout();
                }
            }
        } else {
            self.fired.store(false, Ordering::Release);
        }

        decision
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    use shopfront_core::ADMIN_ROLES;

    use super::*;

    fn input(checked: bool, authenticated: bool, role: &str) -> GuardInput<'_> {
        GuardInput {
            auth_checked: checked,
            is_authenticated: authenticated,
            user_role: role,
            required_roles: Some(ADMIN_ROLES),
        }
    }

    fn counting_guard() -> (RouteGuard, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let guard = RouteGuard::with_forced_logout(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (guard, calls)
    }

    #[test]
    fn test_unchecked_renders_nothing() {
        let (guard, calls) = counting_guard();
        assert_eq!(guard.evaluate(input(false, false, Role::GUEST)), GuardDecision::Pending);
        assert_eq!(guard.evaluate(input(false, true, Role::USER)), GuardDecision::Pending);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_signed_out_redirects_to_admin_login() {
        let guard = RouteGuard::new();
        assert_eq!(
            guard.evaluate(input(true, false, Role::GUEST)),
            GuardDecision::Redirect("/adminLogin")
        );
    }

    #[test]
    fn test_wrong_role_forces_logout_once() {
        let (guard, calls) = counting_guard();
        for _ in 0..3 {
            assert_eq!(guard.evaluate(input(true, true, Role::USER)), GuardDecision::Denied);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_compliant_evaluation_rearms() {
        let (guard, calls) = counting_guard();
        guard.evaluate(input(true, true, Role::USER));
        assert_eq!(guard.evaluate(input(true, true, Role::ADMIN)), GuardDecision::Render);
        guard.evaluate(input(true, true, Role::USER));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_any_role_without_requirement() {
        let guard = RouteGuard::new();
        let open = GuardInput {
            required_roles: None,
            ..input(true, true, Role::USER)
        };
        assert_eq!(guard.evaluate(open), GuardDecision::Render);
    }

    #[test]
    fn test_from_session() {
        let session = Session::signed_out();
        let role = session.role();
        let input = GuardInput::from_session(&session, &role, Some(ADMIN_ROLES));
        assert_eq!(input.user_role, Role::GUEST);
        assert_eq!(RouteGuard::new().evaluate(input), GuardDecision::Redirect(ADMIN_LOGIN_PAGE));
    }
}
