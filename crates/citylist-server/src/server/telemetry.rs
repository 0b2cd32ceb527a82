//! # Telemetry
//!
//! Structured logging is always on: a `tracing-subscriber` registry with an
//! `EnvFilter` (default `info`) and a human-readable fmt layer.
//!
//! ## Feature matrix
//!
//! - `metrics`: Enables OpenTelemetry metrics (counters, histograms).
//! - `stdout`: Enables the stdout exporter for those metrics.
//!
//! Without `metrics`, the recording helpers at the bottom of this module
//! compile to no-ops, so call sites never need `cfg` guards.
//!
//! ## Example usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --bin citylist-server --features metrics,stdout
//! ```

// Disallow using `stdout` without `metrics`
#[cfg(all(feature = "stdout", not(feature = "metrics")))]
compile_error!("The 'stdout' feature requires the 'metrics' feature to be enabled.");

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "metrics")]
use opentelemetry::{
    InstrumentationScope, KeyValue,
    metrics::{Counter, Histogram, Meter},
};
#[cfg(feature = "metrics")]
use opentelemetry_sdk::{Resource, metrics as sdkmetrics};
#[cfg(feature = "metrics")]
use opentelemetry_semantic_conventions as semvcns;
#[cfg(feature = "metrics")]
use std::sync::OnceLock;

pub struct TelemetryProviders {
    #[cfg(feature = "metrics")]
    pub meter_provider: sdkmetrics::SdkMeterProvider,
}

impl TelemetryProviders {
    /// Flushes and stops exporters. Safe to call once at process exit.
    pub fn shutdown(&self) {
        #[cfg(feature = "metrics")]
        {
            if let Err(err) = self.meter_provider.force_flush() {
                eprintln!("Error flushing metrics: {err:#?}");
            }
            if let Err(err) = self.meter_provider.shutdown() {
                eprintln!("Error shutting down meter: {err:#?}");
            }
        }
    }
}

pub fn init_telemetry() -> anyhow::Result<TelemetryProviders> {
    #[cfg(feature = "metrics")]
    let meter_provider = init_metrics();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true)
                .pretty(),
        )
        .try_init()?;

    #[cfg(feature = "metrics")]
    {
        opentelemetry::global::set_meter_provider(meter_provider.clone());
        let scope = InstrumentationScope::builder("citylist")
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_schema_url(semvcns::SCHEMA_URL)
            .build();
        init_metric_handles(opentelemetry::global::meter_with_scope(scope));
    }

    Ok(TelemetryProviders {
        #[cfg(feature = "metrics")]
        meter_provider,
    })
}

#[cfg(feature = "metrics")]
fn resource() -> Resource {
    Resource::builder()
        .with_service_name("citylist")
        .with_schema_url(
            [KeyValue::new(
                semvcns::resource::SERVICE_VERSION,
                env!("CARGO_PKG_VERSION"),
            )],
            semvcns::SCHEMA_URL,
        )
        .build()
}

#[cfg(feature = "metrics")]
fn init_metrics() -> sdkmetrics::SdkMeterProvider {
    let builder = sdkmetrics::SdkMeterProvider::builder().with_resource(resource());

    #[cfg(feature = "stdout")]
    let builder = {
        use opentelemetry_stdout::MetricExporter;
        let exporter = MetricExporter::default();
        let reader = sdkmetrics::PeriodicReader::builder(exporter)
            .with_interval(std::time::Duration::from_secs(5))
            .build();

        builder.with_reader(reader)
    };

    builder.build()
}

// Metric handles - only compiled when metrics feature is enabled
#[cfg(feature = "metrics")]
static REQUESTS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static CITIES_PRODUCED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static CANCELLATIONS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static REQUEST_DURATION_MS: OnceLock<Histogram<f64>> = OnceLock::new();

#[cfg(feature = "metrics")]
fn init_metric_handles(meter: Meter) {
    let _ = REQUESTS.set(
        meter
            .u64_counter("requests")
            .with_description("Calls accepted, by api")
            .build(),
    );

    let _ = CITIES_PRODUCED.set(
        meter
            .u64_counter("cities_produced")
            .with_description("Cities delivered to callers, by api")
            .build(),
    );

    let _ = CANCELLATIONS.set(
        meter
            .u64_counter("cancellations")
            .with_description("Calls ended early, by api and reason")
            .build(),
    );

    let _ = REQUEST_DURATION_MS.set(
        meter
            .f64_histogram("request_duration")
            .with_unit("ms")
            .with_description("End-to-end call duration, by api")
            .build(),
    );
}

// Convenience functions that compile to no-ops when metrics are disabled
#[cfg(feature = "metrics")]
pub fn increment_requests(api: &'static str) {
    if let Some(counter) = REQUESTS.get() {
        counter.add(1, &[KeyValue::new("api", api)]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_requests(_api: &'static str) {}

#[cfg(feature = "metrics")]
pub fn increment_cities_produced(api: &'static str, n: u64) {
    if let Some(counter) = CITIES_PRODUCED.get() {
        counter.add(n, &[KeyValue::new("api", api)]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_cities_produced(_api: &'static str, _n: u64) {}

#[cfg(feature = "metrics")]
pub fn increment_cancellations(api: &'static str, reason: &'static str) {
    if let Some(counter) = CANCELLATIONS.get() {
        counter.add(
            1,
            &[KeyValue::new("api", api), KeyValue::new("reason", reason)],
        );
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_cancellations(_api: &'static str, _reason: &'static str) {}

#[cfg(feature = "metrics")]
pub fn record_request_duration(api: &'static str, ms: f64) {
    if let Some(hist) = REQUEST_DURATION_MS.get() {
        hist.record(ms, &[KeyValue::new("api", api)]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn record_request_duration(_api: &'static str, _ms: f64) {}
