//! Tests for the `lambda.invoke` span as it reaches the exporter.
//!
//! Each test wires the middleware to a tracer provider backed by an
//! in-memory exporter behind a batch processor, so a span is only visible
//! to the exporter once something flushes it.

use aws_lambda_events::apigw::ApiGatewayProxyRequest;
use hello_lambda::{FunctionConfig, InvocationEventLayer, handle};
use lambda_runtime::{Context, LambdaEvent};
use opentelemetry::Value;
use opentelemetry::trace::{Status, TracerProvider as _};
use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider, SpanData};
use serial_test::serial;
use tower::{Layer, Service, ServiceExt, service_fn};
use tracing_subscriber::layer::SubscriberExt;

fn in_memory_provider() -> (SdkTracerProvider, InMemorySpanExporter) {
    let exporter = InMemorySpanExporter::default();
    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter.clone())
        .build();
    (provider, exporter)
}

/// Routes `tracing` spans on the current thread into `provider`.
fn span_bridge(provider: &SdkTracerProvider) -> tracing::subscriber::DefaultGuard {
    let subscriber = tracing_subscriber::registry()
        .with(tracing_opentelemetry::layer().with_tracer(provider.tracer("hello-lambda-test")));
    tracing::subscriber::set_default(subscriber)
}

fn request(method: http::Method, path: &str, request_id: &str) -> LambdaEvent<ApiGatewayProxyRequest> {
    let mut payload = ApiGatewayProxyRequest::default();
    payload.http_method = method;
    payload.path = Some(path.to_string());

    let mut context = Context::default();
    context.request_id = request_id.to_string();

    LambdaEvent::new(payload, context)
}

fn attribute<'a>(span: &'a SpanData, key: &str) -> Option<&'a Value> {
    span.attributes
        .iter()
        .find(|kv| kv.key.as_str() == key)
        .map(|kv| &kv.value)
}

fn string_attribute(span: &SpanData, key: &str) -> Option<String> {
    attribute(span, key).map(|value| value.as_str().into_owned())
}

fn invocation_spans(exporter: &InMemorySpanExporter) -> Vec<SpanData> {
    exporter
        .get_finished_spans()
        .unwrap()
        .into_iter()
        .filter(|span| attribute(span, "faas.trigger").is_some())
        .collect()
}

#[tokio::test(flavor = "current_thread")]
#[serial]
async fn test_span_is_exported_before_response_returns() {
    let (provider, exporter) = in_memory_provider();
    let _bridge = span_bridge(&provider);

    let layer = InvocationEventLayer::builder("netlify-lambdas")
        .tracer_provider(provider.clone())
        .flush_on_end(true)
        .build();
    let mut service = layer.layer(service_fn(|event: LambdaEvent<ApiGatewayProxyRequest>| async move {
        let config = FunctionConfig::default();
        handle(event, &config).await
    }));

    let response = service
        .ready()
        .await
        .unwrap()
        .call(request(http::Method::GET, "/users/42", "req-attributes"))
        .await
        .unwrap();
    assert_eq!(response.status_code, 200);

    let spans = invocation_spans(&exporter);
    assert_eq!(spans.len(), 1, "span must be exported when call returns");
    let span = &spans[0];

    assert_eq!(span.name, "GET /users/42");
    assert_eq!(span.status, Status::Ok);
    assert_eq!(string_attribute(span, "faas.trigger").as_deref(), Some("http"));
    assert_eq!(
        string_attribute(span, "faas.invocation_id").as_deref(),
        Some("req-attributes")
    );
    assert_eq!(
        string_attribute(span, "http.request.method").as_deref(),
        Some("GET")
    );
    assert_eq!(string_attribute(span, "url.path").as_deref(), Some("/users/42"));
    assert_eq!(
        string_attribute(span, "honeycomb.dataset").as_deref(),
        Some("netlify-lambdas")
    );
    assert!(matches!(
        attribute(span, "faas.coldstart"),
        Some(Value::Bool(_))
    ));
    assert!(attribute(span, "error.message").is_none());

    drop(service);
    provider.shutdown().unwrap();
}

#[tokio::test(flavor = "current_thread")]
#[serial]
async fn test_failed_invocation_records_error_status() {
    let (provider, exporter) = in_memory_provider();
    let _bridge = span_bridge(&provider);

    let layer = InvocationEventLayer::builder("netlify-lambdas")
        .tracer_provider(provider.clone())
        .build();
    let mut service = layer.layer(service_fn(|_event: LambdaEvent<ApiGatewayProxyRequest>| async {
        Err::<serde_json::Value, lambda_runtime::Error>("backend unavailable".into())
    }));

    let err = service
        .ready()
        .await
        .unwrap()
        .call(request(http::Method::POST, "/orders", "req-error"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "backend unavailable");

    let spans = invocation_spans(&exporter);
    assert_eq!(spans.len(), 1);
    let span = &spans[0];

    assert!(matches!(span.status, Status::Error { .. }));
    assert_eq!(
        string_attribute(span, "error.message").as_deref(),
        Some("backend unavailable")
    );
    assert_eq!(
        string_attribute(span, "http.request.method").as_deref(),
        Some("POST")
    );

    drop(service);
    provider.shutdown().unwrap();
}

#[tokio::test(flavor = "current_thread")]
#[serial]
async fn test_only_first_invocation_can_be_cold() {
    let (provider, exporter) = in_memory_provider();
    let _bridge = span_bridge(&provider);

    let layer = InvocationEventLayer::builder("netlify-lambdas")
        .tracer_provider(provider.clone())
        .build();
    let mut service = layer.layer(service_fn(|event: LambdaEvent<ApiGatewayProxyRequest>| async move {
        let config = FunctionConfig::default();
        handle(event, &config).await
    }));

    for request_id in ["req-first", "req-second"] {
        service
            .ready()
            .await
            .unwrap()
            .call(request(http::Method::GET, "/", request_id))
            .await
            .unwrap();
    }

    let spans = invocation_spans(&exporter);
    assert_eq!(spans.len(), 2);
    let second = spans
        .iter()
        .find(|span| string_attribute(span, "faas.invocation_id").as_deref() == Some("req-second"))
        .expect("second invocation exported");
    assert!(matches!(
        attribute(second, "faas.coldstart"),
        Some(Value::Bool(false))
    ));

    drop(service);
    provider.shutdown().unwrap();
}

#[tokio::test(flavor = "current_thread")]
#[serial]
async fn test_span_stays_buffered_without_flush_on_end() {
    let (provider, exporter) = in_memory_provider();
    let _bridge = span_bridge(&provider);

    let layer = InvocationEventLayer::builder("netlify-lambdas")
        .tracer_provider(provider.clone())
        .flush_on_end(false)
        .build();
    let mut service = layer.layer(service_fn(|event: LambdaEvent<ApiGatewayProxyRequest>| async move {
        let config = FunctionConfig::default();
        handle(event, &config).await
    }));

    service
        .ready()
        .await
        .unwrap()
        .call(request(http::Method::GET, "/buffered", "req-buffered"))
        .await
        .unwrap();

    assert!(invocation_spans(&exporter).is_empty());

    provider.force_flush().unwrap();
    assert_eq!(invocation_spans(&exporter).len(), 1);

    drop(service);
    provider.shutdown().unwrap();
}
