//! Error types for telemetry initialisation and lifecycle.

use opentelemetry_otlp::ExporterBuildError;
use opentelemetry_sdk::error::OTelSdkError;
use thiserror::Error;

/// Errors raised while building or releasing the telemetry client.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Configuration could not be parsed.
    #[error("telemetry configuration error")]
    Config(#[source] Box<figment::Error>),

    /// The dataset name is empty.
    #[error("telemetry dataset must not be empty")]
    EmptyDataset,

    /// Transmission was requested without a write key.
    #[error("transmission to Honeycomb requires a write key")]
    MissingWriteKey,

    /// The OTLP exporter could not be constructed.
    #[error("failed to build trace exporter")]
    Exporter(#[source] ExporterBuildError),

    /// Flushing buffered events failed.
    #[error("failed to flush telemetry")]
    Flush(#[source] OTelSdkError),

    /// Shutting down the provider failed.
    #[error("failed to shut down telemetry")]
    Shutdown(#[source] OTelSdkError),

    /// A global `tracing` subscriber was already installed.
    #[error("failed to initialise tracing subscriber")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

impl From<figment::Error> for TelemetryError {
    fn from(err: figment::Error) -> Self {
        TelemetryError::Config(Box::new(err))
    }
}
