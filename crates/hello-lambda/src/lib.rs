//! API Gateway proxy function that answers `Hello, World`.
//!
//! The function is assembled from three pieces:
//!
//! - [`init_telemetry`] builds the telemetry client (see `lambda-telemetry`)
//! - [`handle`] maps every request to the same `200 Hello, World` response,
//!   optionally logging the process environment first
//! - [`InvocationEventLayer`] records one telemetry event per invocation
//!
//! ## Example
//!
//! ```ignore
//! use hello_lambda::{FunctionConfig, create_http_service, init_telemetry};
//! use lambda_runtime::Runtime;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), lambda_runtime::Error> {
//!     let guard = init_telemetry()?;
//!     let config = FunctionConfig::load()?;
//!     let service = create_http_service(&guard, config);
//!     Runtime::new(service).run().await
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cold_start;
mod future;
mod layer;
mod service;

pub mod config;
pub mod environment;
pub mod error;
pub mod handler;

pub use cold_start::take_cold_start;
pub use config::FunctionConfig;
pub use error::{FunctionError, Result};
pub use future::InvocationEventFuture;
pub use handler::{GREETING, handle, hello_response};
pub use layer::{InvocationEventLayer, InvocationEventLayerBuilder};
pub use service::InvocationEventService;

use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use lambda_runtime::{LambdaEvent, service_fn};
use lambda_telemetry::{TelemetryBuilder, TelemetryGuard};
use std::sync::Arc;
use tower::ServiceBuilder;

const TELEMETRY_CONFIG_PATH: &str = "/var/task/telemetry.toml";

/// Builds the telemetry client for this function.
///
/// Configuration is loaded from:
/// 1. Defaults (dataset `netlify-lambdas`, transmission disabled)
/// 2. Optional config file at `/var/task/telemetry.toml`
/// 3. `HONEYCOMB_*` and `LAMBDA_TELEMETRY_*` environment variables
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the client cannot be
/// built. Callers are expected to abort start-up.
pub fn init_telemetry() -> Result<TelemetryGuard> {
    let guard = TelemetryBuilder::new()
        .with_file(TELEMETRY_CONFIG_PATH)
        .with_standard_env()
        .service_version(env!("CARGO_PKG_VERSION"))
        .build()?;

    Ok(guard)
}

/// Creates the instrumented handler service.
///
/// The telemetry guard is borrowed only to attach its tracer provider; it must
/// outlive the runtime loop so that shutdown can flush it.
pub fn create_http_service(
    guard: &TelemetryGuard,
    config: FunctionConfig,
) -> impl tower::Service<
    LambdaEvent<ApiGatewayProxyRequest>,
    Response = ApiGatewayProxyResponse,
    Error = lambda_runtime::Error,
    Future = impl std::future::Future<
        Output = std::result::Result<ApiGatewayProxyResponse, lambda_runtime::Error>,
    > + Send,
> + Clone {
    let mut layer_builder =
        InvocationEventLayer::builder(guard.dataset()).flush_on_end(config.flush_on_end);

    if let Some(provider) = guard.tracer_provider() {
        layer_builder = layer_builder.tracer_provider(provider.clone());
    }

    let config = Arc::new(config);

    ServiceBuilder::new()
        .layer(layer_builder.build())
        .service(service_fn(move |event: LambdaEvent<ApiGatewayProxyRequest>| {
            let config = Arc::clone(&config);
            async move { handle(event, &config).await }
        }))
}
