//! Telemetry client lifecycle.
//!
//! [`TelemetryGuard`] is the only handle to the telemetry client. It is built
//! once at process start and passed by reference to whatever needs it. When it
//! is dropped, buffered events are flushed and the provider is shut down.

use crate::config::{TelemetryConfig, Transmission};
use crate::error::TelemetryError;
use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{Protocol, WithExportConfig, WithHttpConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const TRACER_NAME: &str = "lambda-telemetry";

/// Owns the telemetry client for the lifetime of the process.
///
/// # Example
///
/// ```no_run
/// use lambda_telemetry::{TelemetryBuilder, TelemetryError};
///
/// fn main() -> Result<(), TelemetryError> {
///     let guard = TelemetryBuilder::new().build()?;
///
///     tracing::info!(dataset = guard.dataset(), "Application running");
///
///     // Explicit shutdown surfaces errors; dropping the guard does the same
///     // work and reports failures on stderr.
///     guard.shutdown()
/// }
/// ```
pub struct TelemetryGuard {
    dataset: String,
    transmission: Transmission,
    tracer_provider: Option<SdkTracerProvider>,
}

impl TelemetryGuard {
    /// Builds the client from an already validated configuration.
    pub(crate) fn from_config(config: TelemetryConfig) -> Result<Self, TelemetryError> {
        let resource = build_resource(&config);

        let provider = match config.transmission {
            Transmission::Disabled => SdkTracerProvider::builder().with_resource(resource).build(),
            Transmission::Honeycomb => build_honeycomb_provider(&config, resource)?,
        };

        opentelemetry::global::set_tracer_provider(provider.clone());

        if config.init_tracing_subscriber {
            init_subscriber(&provider)?;
        }

        tracing::debug!(
            target: "telemetry_lifecycle",
            dataset = %config.dataset,
            transmission = ?config.transmission,
            "Telemetry client initialised"
        );

        Ok(Self {
            dataset: config.dataset,
            transmission: config.transmission,
            tracer_provider: Some(provider),
        })
    }

    /// Returns the dataset events are labelled with.
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// Returns `true` if events are exported out of the process.
    pub fn is_transmitting(&self) -> bool {
        self.transmission != Transmission::Disabled
    }

    /// Returns the underlying tracer provider.
    pub fn tracer_provider(&self) -> Option<&SdkTracerProvider> {
        self.tracer_provider.as_ref()
    }

    /// Flushes buffered events.
    ///
    /// Failures are logged with target `telemetry_lifecycle` rather than
    /// returned, so this is safe to call on the request path.
    pub fn flush(&self) {
        if let Some(provider) = &self.tracer_provider
            && let Err(e) = provider.force_flush()
        {
            tracing::warn!(target: "telemetry_lifecycle", error = %e, "Failed to flush telemetry");
        }
    }

    /// Flushes and shuts down the client, consuming the guard.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::Flush`] or [`TelemetryError::Shutdown`] for
    /// the first failing step.
    pub fn shutdown(mut self) -> Result<(), TelemetryError> {
        if let Some(provider) = self.tracer_provider.take() {
            provider.force_flush().map_err(TelemetryError::Flush)?;
            provider.shutdown().map_err(TelemetryError::Shutdown)?;
        }
        Ok(())
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take() {
            // The subscriber may already be gone at this point, so stderr.
            for err in release(&provider) {
                let cause = std::error::Error::source(&err)
                    .map(ToString::to_string)
                    .unwrap_or_default();
                eprintln!("Error releasing telemetry for dataset {}: {err}: {cause}", self.dataset);
            }
        }
    }
}

/// Flushes then shuts down `provider`, attempting shutdown even when the
/// flush fails. Returns every failure in order.
fn release(provider: &SdkTracerProvider) -> Vec<TelemetryError> {
    let mut errors = Vec::new();
    if let Err(e) = provider.force_flush() {
        errors.push(TelemetryError::Flush(e));
    }
    if let Err(e) = provider.shutdown() {
        errors.push(TelemetryError::Shutdown(e));
    }
    errors
}

impl std::fmt::Debug for TelemetryGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryGuard")
            .field("dataset", &self.dataset)
            .field("transmission", &self.transmission)
            .field("active", &self.tracer_provider.is_some())
            .finish()
    }
}

fn build_resource(config: &TelemetryConfig) -> Resource {
    let mut attributes = vec![KeyValue::new("service.name", config.dataset.clone())];

    if let Some(version) = &config.service_version {
        attributes.push(KeyValue::new("service.version", version.clone()));
    }

    if let Ok(function_name) = std::env::var("AWS_LAMBDA_FUNCTION_NAME") {
        attributes.push(KeyValue::new("faas.name", function_name));
    }

    if let Ok(region) = std::env::var("AWS_REGION") {
        attributes.push(KeyValue::new("cloud.region", region));
    }

    Resource::builder().with_attributes(attributes).build()
}

fn build_honeycomb_provider(
    config: &TelemetryConfig,
    resource: Resource,
) -> Result<SdkTracerProvider, TelemetryError> {
    let write_key = config
        .write_key
        .clone()
        .ok_or(TelemetryError::MissingWriteKey)?;

    let headers = HashMap::from([
        ("x-honeycomb-team".to_string(), write_key),
        ("x-honeycomb-dataset".to_string(), config.dataset.clone()),
    ]);

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(config.traces_endpoint())
        .with_timeout(config.timeout)
        .with_protocol(Protocol::HttpBinary)
        .with_headers(headers)
        .build()
        .map_err(TelemetryError::Exporter)?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build())
}

fn init_subscriber(provider: &SdkTracerProvider) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // CloudWatch timestamps every line already.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .without_time();

    let telemetry_layer = tracing_opentelemetry::layer().with_tracer(provider.tracer(TRACER_NAME));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(telemetry_layer)
        .try_init()?;

    Ok(())
}
