//! Function configuration.
//!
//! Loaded with figment from (later sources override earlier):
//! 1. Default values
//! 2. Config file: `/var/task/hello-lambda.toml` (optional)
//! 3. Environment variables with `HELLO_LAMBDA_` prefix
//!
//! | Variable | Default |
//! |----------|---------|
//! | `HELLO_LAMBDA_LOG_ENVIRONMENT` | `false` |
//! | `HELLO_LAMBDA_REDACT_ENVIRONMENT` | `true` |
//! | `HELLO_LAMBDA_FLUSH_ON_END` | `true` |

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "/var/task/hello-lambda.toml";
const ENV_PREFIX: &str = "HELLO_LAMBDA_";

/// Runtime switches for the handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionConfig {
    /// Log every environment variable on each invocation.
    pub log_environment: bool,
    /// Mask values of sensitive-looking variables when logging the environment.
    pub redact_environment: bool,
    /// Flush telemetry before returning each response.
    pub flush_on_end: bool,
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self {
            log_environment: false,
            redact_environment: true,
            flush_on_end: true,
        }
    }
}

impl FunctionConfig {
    /// Loads configuration from the default file path and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    #[allow(clippy::result_large_err)]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Loads configuration from a custom config file path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    #[allow(clippy::result_large_err)]
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(FunctionConfig::default()));

        if config_path.as_ref().exists() {
            figment = figment.merge(Toml::file(config_path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX)).extract()
    }
}
