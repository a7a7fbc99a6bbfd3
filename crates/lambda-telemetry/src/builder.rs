//! Fluent builder for the telemetry client.

use crate::config::{ENV_PREFIX, TelemetryConfig, Transmission, honeycomb_env, saturating_millis};
use crate::error::TelemetryError;
use crate::guard::TelemetryGuard;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use std::path::Path;
use std::time::Duration;

/// Builds a [`TelemetryGuard`] from layered configuration.
///
/// Each call merges a new layer on top of the previous ones, so later calls
/// take precedence. Programmatic setters therefore override anything read from
/// files or the environment when they are called afterwards.
///
/// ```no_run
/// use lambda_telemetry::TelemetryBuilder;
///
/// let guard = TelemetryBuilder::new()
///     .with_standard_env()
///     .dataset("netlify-lambdas")
///     .init_tracing_subscriber(false)
///     .build()
///     .expect("telemetry");
/// assert!(!guard.is_transmitting());
/// ```
#[must_use = "builders do nothing unless .build() is called"]
pub struct TelemetryBuilder {
    figment: Figment,
}

impl TelemetryBuilder {
    /// Starts from compiled-in defaults.
    pub fn new() -> Self {
        Self {
            figment: Figment::from(Serialized::defaults(TelemetryConfig::default())),
        }
    }

    /// Starts from an explicit configuration value.
    pub fn from_config(config: TelemetryConfig) -> Self {
        Self {
            figment: Figment::from(Serialized::defaults(config)),
        }
    }

    /// Layers a TOML file. Missing files are skipped.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        if path.as_ref().exists() {
            self.figment = self.figment.merge(Toml::file(path));
        }
        self
    }

    /// Layers the standard Honeycomb variables, then `LAMBDA_TELEMETRY_*`.
    pub fn with_standard_env(mut self) -> Self {
        self.figment = self
            .figment
            .merge(honeycomb_env())
            .merge(Env::prefixed(ENV_PREFIX));
        self
    }

    /// Sets the dataset label.
    pub fn dataset(self, dataset: impl Into<String>) -> Self {
        self.set("dataset", dataset.into())
    }

    /// Sets the Honeycomb write key.
    pub fn write_key(self, key: impl Into<String>) -> Self {
        self.set("write_key", key.into())
    }

    /// Sets the transmission backend.
    pub fn transmission(self, transmission: Transmission) -> Self {
        self.set("transmission", transmission)
    }

    /// Sets the Honeycomb API base URL.
    pub fn api_host(self, host: impl Into<String>) -> Self {
        self.set("api_host", host.into())
    }

    /// Sets the export request timeout.
    pub fn timeout(self, timeout: Duration) -> Self {
        self.set("timeout", saturating_millis(timeout))
    }

    /// Sets the `service.version` resource attribute.
    pub fn service_version(self, version: impl Into<String>) -> Self {
        self.set("service_version", version.into())
    }

    /// Controls whether [`build`](Self::build) installs the global `tracing`
    /// subscriber. Tests usually turn this off.
    pub fn init_tracing_subscriber(self, init: bool) -> Self {
        self.set("init_tracing_subscriber", init)
    }

    /// Resolves the configuration without building the client.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::Config`] if any layer fails to parse.
    pub fn resolve(&self) -> Result<TelemetryConfig, TelemetryError> {
        Ok(self.figment.extract()?)
    }

    /// Validates the configuration and builds the client.
    ///
    /// # Errors
    ///
    /// - [`TelemetryError::Config`] if configuration fails to parse
    /// - [`TelemetryError::EmptyDataset`] if the dataset is blank
    /// - [`TelemetryError::MissingWriteKey`] if transmitting without a key
    /// - [`TelemetryError::Exporter`] if the exporter cannot be built
    /// - [`TelemetryError::Subscriber`] if a subscriber is already installed
    pub fn build(self) -> Result<TelemetryGuard, TelemetryError> {
        let config = self.resolve()?;
        validate(&config)?;
        TelemetryGuard::from_config(config)
    }

    fn set<T: serde::Serialize>(mut self, key: &str, value: T) -> Self {
        self.figment = self.figment.merge(Serialized::default(key, value));
        self
    }
}

impl Default for TelemetryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn validate(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    if config.dataset.trim().is_empty() {
        return Err(TelemetryError::EmptyDataset);
    }

    let has_key = config
        .write_key
        .as_deref()
        .is_some_and(|key| !key.trim().is_empty());

    if config.is_transmitting() && !has_key {
        return Err(TelemetryError::MissingWriteKey);
    }

    Ok(())
}
