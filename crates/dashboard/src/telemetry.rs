//! Logging and error-tracking setup.
//!
//! Logs go to stderr so they never interleave with a dashboard rendered on
//! stdout.

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::DashboardConfig;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "wb_dashboard=info,wb_dashboard_cli=info";

/// Field name carried by log events whose error was already sent with
/// [`sentry::capture_error`].
pub const CAPTURED_EVENT_FIELD: &str = "sentry_event_id";

/// Initialize Sentry error tracking and return guard that must be kept alive.
///
/// Returns `None` when no DSN is configured.
#[must_use]
pub fn init_sentry(config: &DashboardConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_deref()?;
    let guard = sentry::init((dsn, sentry_options(config)));
    tracing::info!(
        environment = config.sentry_environment.as_deref().unwrap_or("unset"),
        sample_rate = config.sentry_sample_rate,
        "Sentry initialized"
    );
    Some(guard)
}

fn sentry_options(config: &DashboardConfig) -> sentry::ClientOptions {
    sentry::ClientOptions {
        release: sentry::release_name!(),
        environment: config.sentry_environment.clone().map(Into::into),
        sample_rate: config.sentry_sample_rate,
        attach_stacktrace: true,
        ..Default::default()
    }
}

/// Install the global tracing subscriber.
///
/// Call after [`init_sentry`] so the Sentry layer picks up the client.
pub fn init_tracing(config: &DashboardConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let json_layer = config.log_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!config.log_json)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

/// Map a tracing event to what the Sentry layer should do with it.
///
/// Warnings are sent as events: the dashboard warns only when the backend
/// degrades (for example an unreadable max price) and keeps running, so a
/// warning is the only trace such a fault leaves. Events that carry
/// [`CAPTURED_EVENT_FIELD`] were already sent explicitly and become
/// breadcrumbs.
#[must_use]
pub fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    let captured = metadata.fields().field(CAPTURED_EVENT_FIELD).is_some();
    event_filter_for(*metadata.level(), captured)
}

fn event_filter_for(level: tracing::Level, captured: bool) -> sentry_tracing::EventFilter {
    use sentry::integrations::tracing::EventFilter;

    if captured {
        return EventFilter::Breadcrumb;
    }
    match level {
        tracing::Level::ERROR | tracing::Level::WARN => EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => EventFilter::Breadcrumb,
        _ => EventFilter::Ignore,
    }
}
