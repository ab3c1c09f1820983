//! Shared tracing/logging initialization.
//!
//! Sets up `tracing_subscriber` with an env-filter and optional JSON output.
//! With the `metrics` feature, an `OpenTelemetry` layer can be attached too.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialise the global tracing subscriber.
///
/// * `default_filter` -- default `RUST_LOG` value when the env-var is not set
///   (e.g. `"appstats_server=info"`).
/// * `log_json` -- when `true`, emit structured JSON log lines instead of the
///   human-readable format.
pub fn init_tracing(default_filter: &str, log_json: bool) {
    let env_filter = env_filter(default_filter);
    if log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Initialise tracing, exporting spans and metrics over OTLP when an
/// endpoint is given.
///
/// Returns the guard that keeps the exporters alive; `None` when no endpoint
/// was supplied or the pipeline failed to build (the failure is logged and
/// plain tracing is used instead).
#[cfg(feature = "metrics")]
pub fn init_tracing_with_metrics(
    default_filter: &str,
    log_json: bool,
    metrics_endpoint: Option<&str>,
) -> Option<crate::metrics::MetricsGuard> {
    use opentelemetry::trace::TracerProvider as _;

    let Some(endpoint) = metrics_endpoint else {
        init_tracing(default_filter, log_json);
        return None;
    };

    let guard = match crate::metrics::init_metrics(endpoint) {
        Ok(guard) => guard,
        Err(e) => {
            init_tracing(default_filter, log_json);
            tracing::warn!(error = %e, endpoint, "OpenTelemetry pipeline unavailable");
            return None;
        }
    };

    let otel_layer =
        tracing_opentelemetry::layer().with_tracer(guard.tracer_provider().tracer("appstats"));
    let env_filter = env_filter(default_filter);
    if log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(otel_layer)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(otel_layer)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    Some(guard)
}

fn env_filter(default_filter: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
    )
}
