//! Tracing and Sentry setup, plus the Sentry scope helpers the session
//! store calls on login and logout.

use sentry::integrations::tracing as sentry_tracing;
use shopfront_core::UserRecord;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ClientConfig;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "shopfront_client=info,shopfront_cli=info";

/// Initialize Sentry error tracking and return the guard that must be kept
/// alive. `None` when no DSN is configured.
#[must_use]
pub fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the global subscriber: `EnvFilter` (falling back to
/// `default_filter`), a stderr `fmt` layer and the Sentry layer.
///
/// Does nothing if a global subscriber is already set.
pub fn init_tracing(default_filter: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .try_init();
}

/// Associate subsequent Sentry events with `user`.
pub fn set_sentry_user(user: &UserRecord) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: user.id.map(|id| id.to_string()),
            email: Some(user.email.to_string()),
            username: user.username.clone(),
            ..Default::default()
        }));
    });
}

/// Stop associating Sentry events with a user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Record a breadcrumb for a user-visible action.
pub fn add_breadcrumb(category: &str, message: &str) {
    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_owned()),
        message: Some(message.to_owned()),
        level: sentry::Level::Info,
        ..Default::default()
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sentry_disabled_without_dsn() {
        let config = ClientConfig::new(
            url::Url::parse("http://localhost/api").unwrap(),
            url::Url::parse("http://localhost/api/admin").unwrap(),
        );
        assert!(init_sentry(&config).is_none());
    }

    #[test]
    fn test_scope_helpers_tag_events() {
        let user = UserRecord::new(
            shopfront_core::Email::parse("ada@example.com").unwrap(),
            shopfront_core::Role::new(shopfront_core::Role::USER),
        );

        let events = sentry::test::with_captured_events(|| {
            set_sentry_user(&user);
            add_breadcrumb("auth", "Signed in");
            sentry::capture_message("signed in", sentry::Level::Info);
            clear_sentry_user();
            sentry::capture_message("signed out", sentry::Level::Info);
        });

        assert_eq!(events.len(), 2);
        let signed_in = events.first().unwrap();
        assert_eq!(
            signed_in.user.as_ref().and_then(|u| u.email.as_deref()),
            Some("ada@example.com")
        );
        let crumb = signed_in.breadcrumbs.values.first().unwrap();
        assert_eq!(crumb.category.as_deref(), Some("auth"));
        assert_eq!(crumb.message.as_deref(), Some("Signed in"));
        assert!(events.last().unwrap().user.is_none());
    }
}
