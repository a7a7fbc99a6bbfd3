//! Telemetry client configuration.
//!
//! Values are layered with figment. From lowest to highest priority:
//! 1. Compiled-in defaults
//! 2. An optional TOML file
//! 3. Standard Honeycomb environment variables
//! 4. `LAMBDA_TELEMETRY_*` environment variables
//! 5. Programmatic overrides on [`TelemetryBuilder`](crate::TelemetryBuilder)
//!
//! | Variable | Config key |
//! |----------|------------|
//! | `HONEYCOMB_DATASET` | `dataset` |
//! | `HONEYCOMB_API_KEY` / `HONEYCOMB_WRITEKEY` | `write_key` |
//! | `HONEYCOMB_API_HOST` | `api_host` |

use figment::providers::Serialized;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Dataset used when none is configured.
pub const DEFAULT_DATASET: &str = "netlify-lambdas";

/// Honeycomb API host used when none is configured.
pub const DEFAULT_API_HOST: &str = "https://api.honeycomb.io";

pub(crate) const ENV_PREFIX: &str = "LAMBDA_TELEMETRY_";

/// Where telemetry events are sent.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Transmission {
    /// Events are recorded in-process and discarded.
    #[default]
    Disabled,
    /// Events are exported to the Honeycomb API over OTLP/HTTP.
    Honeycomb,
}

/// Resolved telemetry configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Dataset label attached to every event.
    pub dataset: String,
    /// Honeycomb write key. Required when transmitting.
    pub write_key: Option<String>,
    /// Transmission backend.
    pub transmission: Transmission,
    /// Base URL of the Honeycomb API.
    pub api_host: String,
    /// Export request timeout in milliseconds.
    #[serde(with = "duration_ms")]
    pub timeout: Duration,
    /// Optional `service.version` resource attribute.
    pub service_version: Option<String>,
    /// Whether to install the global `tracing` subscriber.
    pub init_tracing_subscriber: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            dataset: DEFAULT_DATASET.to_string(),
            write_key: None,
            transmission: Transmission::Disabled,
            api_host: DEFAULT_API_HOST.to_string(),
            timeout: Duration::from_secs(3),
            service_version: None,
            init_tracing_subscriber: true,
        }
    }
}

impl TelemetryConfig {
    /// Returns the OTLP traces endpoint derived from `api_host`.
    pub fn traces_endpoint(&self) -> String {
        format!("{}/v1/traces", self.api_host.trim_end_matches('/'))
    }

    /// Returns `true` if events will leave the process.
    pub fn is_transmitting(&self) -> bool {
        self.transmission != Transmission::Disabled
    }
}

// Keeps the write key out of logs.
impl fmt::Debug for TelemetryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelemetryConfig")
            .field("dataset", &self.dataset)
            .field("write_key", &self.write_key.as_ref().map(|_| "<redacted>"))
            .field("transmission", &self.transmission)
            .field("api_host", &self.api_host)
            .field("timeout", &self.timeout)
            .field("service_version", &self.service_version)
            .field("init_tracing_subscriber", &self.init_tracing_subscriber)
            .finish()
    }
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct HoneycombEnv {
    #[serde(skip_serializing_if = "Option::is_none")]
    dataset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    write_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_host: Option<String>,
}

/// Reads the standard Honeycomb environment variables.
///
/// `HONEYCOMB_API_KEY` wins over the older `HONEYCOMB_WRITEKEY`. Empty values
/// are ignored.
pub(crate) fn honeycomb_env() -> Serialized<HoneycombEnv> {
    let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

    let env = HoneycombEnv {
        dataset: var("HONEYCOMB_DATASET"),
        write_key: var("HONEYCOMB_API_KEY").or_else(|| var("HONEYCOMB_WRITEKEY")),
        api_host: var("HONEYCOMB_API_HOST"),
    };

    Serialized::defaults(env)
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub(crate) fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

mod duration_ms {
    use super::saturating_millis;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(saturating_millis(*duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
