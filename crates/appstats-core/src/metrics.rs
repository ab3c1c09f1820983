//! `OpenTelemetry` export for traces and store query metrics.
//!
//! This module is only compiled when the `metrics` Cargo feature is enabled.
//! Spans and metrics go to an OTLP receiver (e.g. an `OpenTelemetry`
//! Collector) over gRPC.

use std::sync::OnceLock;

use opentelemetry::metrics::Counter;
use opentelemetry::{KeyValue, global};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;

const SERVICE_NAME: &str = "appstats-server";

/// Errors that can occur during metrics / tracing pipeline initialisation.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to build an OTLP exporter.
    #[error("failed to build OTLP exporter: {0}")]
    ExporterBuild(#[from] opentelemetry_otlp::ExporterBuildError),

    /// Failed during `OTel` SDK shutdown or flush.
    #[error("OpenTelemetry SDK error: {0}")]
    Sdk(#[from] opentelemetry_sdk::error::OTelSdkError),
}

/// Keeps the `OpenTelemetry` providers alive.
///
/// Dropping it does not flush; call [`MetricsGuard::shutdown`] before exit.
pub struct MetricsGuard {
    tracer_provider: SdkTracerProvider,
    meter_provider: SdkMeterProvider,
}

impl MetricsGuard {
    pub const fn tracer_provider(&self) -> &SdkTracerProvider {
        &self.tracer_provider
    }

    /// Flush and shut down both providers.
    pub fn shutdown(self) -> Result<(), MetricsError> {
        self.tracer_provider.shutdown()?;
        self.meter_provider.shutdown()?;
        Ok(())
    }
}

/// Build the OTLP pipeline for traces and metrics.
///
/// * `endpoint` -- OTLP receiver URL, e.g. `"http://localhost:4317"`.
pub fn init_metrics(endpoint: &str) -> Result<MetricsGuard, MetricsError> {
    let resource = Resource::builder().with_service_name(SERVICE_NAME).build();

    let trace_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let tracer_provider = SdkTracerProvider::builder()
        .with_resource(resource.clone())
        .with_batch_exporter(trace_exporter)
        .build();

    global::set_tracer_provider(tracer_provider.clone());

    let metric_exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let meter_provider = SdkMeterProvider::builder()
        .with_resource(resource)
        .with_periodic_exporter(metric_exporter)
        .build();

    global::set_meter_provider(meter_provider.clone());

    Ok(MetricsGuard {
        tracer_provider,
        meter_provider,
    })
}

fn query_counter() -> &'static Counter<u64> {
    static COUNTER: OnceLock<Counter<u64>> = OnceLock::new();
    COUNTER.get_or_init(|| {
        global::meter(SERVICE_NAME)
            .u64_counter("appstats.store.queries")
            .with_description("Store queries executed, by query and outcome")
            .build()
    })
}

/// Count one store query. `query` is a static label such as `"list_applications"`.
pub fn record_query(query: &'static str, ok: bool) {
    query_counter().add(
        1,
        &[
            KeyValue::new("query", query),
            KeyValue::new("outcome", if ok { "ok" } else { "error" }),
        ],
    );
}
