//! Tracing and logging configuration for the service
//!
//! Development gets pretty, human-readable output with source locations;
//! production gets flattened JSON lines for log aggregation.

use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Environment;

/// Initialize tracing/logging based on the environment
///
/// `RUST_LOG` overrides the default filter (e.g. `RUST_LOG=debug,tower_http=trace`).
pub fn init_tracing(env: &Environment) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(env)));

    if env.is_development() {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .pretty()
                    .with_filter(env_filter),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .flatten_event(true)
                    .with_target(true)
                    .with_filter(env_filter),
            )
            .init();
    }

    tracing::info!(environment = ?env, "Tracing initialized");
}

/// Filter used when `RUST_LOG` is not set.
pub const fn default_directives(env: &Environment) -> &'static str {
    match env {
        Environment::Development => "info,ciyu_api=debug,ciyu_db=debug,tower_http=debug,sqlx=warn",
        Environment::Production => "info,tower_http=info,sqlx=warn",
    }
}
