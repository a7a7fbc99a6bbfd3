//! Error types for function start-up.

use lambda_telemetry::TelemetryError;
use thiserror::Error;

/// A specialised Result type for start-up operations.
pub type Result<T> = std::result::Result<T, FunctionError>;

/// Errors that abort function start-up.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum FunctionError {
    /// Configuration error.
    #[error("configuration error")]
    Config(#[source] Box<figment::Error>),

    /// The telemetry client could not be initialised.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

impl From<figment::Error> for FunctionError {
    fn from(err: figment::Error) -> Self {
        FunctionError::Config(Box::new(err))
    }
}
