//! Event telemetry client for Lambda functions.
//!
//! This crate builds a process-wide telemetry client labelled with a
//! *dataset* name and hands it back as a [`TelemetryGuard`]. The guard owns
//! the OpenTelemetry tracer provider and installs the `tracing` subscriber
//! that bridges spans into it. When the guard goes out of scope, buffered
//! events are flushed and the provider is shut down.
//!
//! Transmission is opt-in. With the default configuration (a dataset name and
//! nothing else) the client is fully constructed but has no exporter, so no
//! event leaves the process. Setting the transmission to
//! [`Transmission::Honeycomb`] together with a write key exports events over
//! OTLP/HTTP to the Honeycomb API.
//!
//! # Example
//!
//! ```no_run
//! use lambda_telemetry::{TelemetryBuilder, TelemetryError, Transmission};
//!
//! fn main() -> Result<(), TelemetryError> {
//!     // Dataset only: nothing is transmitted
//!     let guard = TelemetryBuilder::new()
//!         .dataset("netlify-lambdas")
//!         .build()?;
//!     drop(guard);
//!
//!     // Layered configuration with export enabled
//!     let _guard = TelemetryBuilder::new()
//!         .with_file("/var/task/telemetry.toml")
//!         .with_standard_env()
//!         .transmission(Transmission::Honeycomb)
//!         .write_key("hcaik_...")
//!         .build()?;
//!
//!     tracing::info!("Application running");
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod error;
mod guard;

pub use builder::TelemetryBuilder;
pub use config::{DEFAULT_API_HOST, DEFAULT_DATASET, TelemetryConfig, Transmission};
pub use error::TelemetryError;
pub use guard::TelemetryGuard;
