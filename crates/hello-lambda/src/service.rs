//! Tower service behind [`InvocationEventLayer`](crate::InvocationEventLayer).

use crate::cold_start::take_cold_start;
use crate::future::InvocationEventFuture;
use aws_lambda_events::apigw::ApiGatewayProxyRequest;
use lambda_runtime::LambdaEvent;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_semantic_conventions::attribute::{
    CLOUD_PROVIDER, CLOUD_REGION, FAAS_NAME, HTTP_REQUEST_METHOD, URL_PATH,
};
use std::task::{Context, Poll};
use tower::Service;
use tracing::Span;
use tracing::field::Empty;

/// Service that wraps each invocation in a `lambda.invoke` span.
#[derive(Clone)]
pub struct InvocationEventService<S> {
    inner: S,
    dataset: String,
    tracer_provider: Option<SdkTracerProvider>,
    flush_on_end: bool,
}

impl<S> InvocationEventService<S> {
    pub(crate) fn new(
        inner: S,
        dataset: String,
        tracer_provider: Option<SdkTracerProvider>,
        flush_on_end: bool,
    ) -> Self {
        Self {
            inner,
            dataset,
            tracer_provider,
            flush_on_end,
        }
    }
}

impl<S> Service<LambdaEvent<ApiGatewayProxyRequest>> for InvocationEventService<S>
where
    S: Service<LambdaEvent<ApiGatewayProxyRequest>>,
    S::Error: std::fmt::Display,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = InvocationEventFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, event: LambdaEvent<ApiGatewayProxyRequest>) -> Self::Future {
        let span = tracing::info_span!(
            "lambda.invoke",
            otel.name = Empty,
            otel.kind = "server",
            otel.status_code = Empty,
            error.message = Empty,
            honeycomb.dataset = %self.dataset,
            faas.trigger = "http",
            faas.invocation_id = %event.context.request_id,
            faas.coldstart = take_cold_start(),
            faas.name = Empty,
            cloud.provider = Empty,
            cloud.region = Empty,
            http.request.method = Empty,
            url.path = Empty,
        );

        record_request_attributes(&span, &event);

        let future = {
            let _entered = span.enter();
            self.inner.call(event)
        };

        InvocationEventFuture::new(
            future,
            span,
            self.tracer_provider.clone(),
            self.flush_on_end,
        )
    }
}

fn record_request_attributes(span: &Span, event: &LambdaEvent<ApiGatewayProxyRequest>) {
    let method = event.payload.http_method.as_str();
    let path = event.payload.path.as_deref().unwrap_or("/");

    span.record("otel.name", format!("{method} {path}").as_str());
    span.record(HTTP_REQUEST_METHOD, method);
    span.record(URL_PATH, path);
    span.record(CLOUD_PROVIDER, "aws");

    let function_name = event.context.env_config.function_name.as_str();
    if !function_name.is_empty() {
        span.record(FAAS_NAME, function_name);
    }

    if let Ok(region) = std::env::var("AWS_REGION") {
        span.record(CLOUD_REGION, region.as_str());
    }
}
