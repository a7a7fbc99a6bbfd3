//! Lambda entry point.
//!
//! Environment variables:
//! - `AWS_LAMBDA_RUNTIME_API` - Required, set by the Lambda service
//! - `HONEYCOMB_DATASET`, `HONEYCOMB_API_KEY` - Telemetry dataset and write key
//! - `LAMBDA_TELEMETRY_TRANSMISSION` - `disabled` (default) or `honeycomb`
//! - `HELLO_LAMBDA_LOG_ENVIRONMENT` - Log the environment on every request

use hello_lambda::{FunctionConfig, FunctionError, create_http_service, init_telemetry};
use lambda_runtime::Runtime;

fn main() -> Result<(), lambda_runtime::Error> {
    // Built before the async runtime starts: the blocking OTLP HTTP client
    // must not be created on a runtime thread.
    let guard = init_telemetry()?;

    let config = FunctionConfig::load().map_err(FunctionError::from)?;
    tracing::debug!(?config, dataset = guard.dataset(), "Configuration loaded");

    let service = create_http_service(&guard, config);

    // Runtime::new rather than run(): run() adds its own tracing layer whose
    // span is still open when the invocation flush happens.
    let result = tokio::runtime::Runtime::new()?
        .block_on(async move { Runtime::new(service).run().await });

    guard.shutdown()?;
    result
}
