//! The request handler.

use crate::config::FunctionConfig;
use crate::environment::log_environment;
use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use aws_lambda_events::encodings::Body;
use lambda_runtime::LambdaEvent;

/// Body returned for every request.
pub const GREETING: &str = "Hello, World";

/// Builds the fixed `200 Hello, World` response.
pub fn hello_response() -> ApiGatewayProxyResponse {
    let mut response = ApiGatewayProxyResponse::default();
    response.status_code = 200;
    response.body = Some(Body::Text(GREETING.to_string()));
    response
}

/// Handles one API Gateway proxy request.
///
/// The request content is ignored. When `log_environment` is enabled the
/// process environment is logged first. This never returns `Err`; the error
/// type is part of the runtime contract only.
pub async fn handle(
    event: LambdaEvent<ApiGatewayProxyRequest>,
    config: &FunctionConfig,
) -> Result<ApiGatewayProxyResponse, lambda_runtime::Error> {
    if config.log_environment {
        log_environment(config.redact_environment);
    }

    tracing::debug!(request_id = %event.context.request_id, "Returning greeting");

    Ok(hello_response())
}
