//! Tower layer that records one telemetry event per invocation.

use crate::service::InvocationEventService;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tower::Layer;

/// Wraps a handler so each invocation opens a `lambda.invoke` span.
///
/// The span is labelled with the dataset and request attributes, closed when
/// the handler completes, and, if `flush_on_end` is set, flushed through the
/// attached tracer provider before the response is handed back to the
/// runtime.
///
/// ```ignore
/// use hello_lambda::InvocationEventLayer;
/// use tower::ServiceBuilder;
///
/// let layer = InvocationEventLayer::builder("netlify-lambdas")
///     .tracer_provider(provider)
///     .build();
///
/// let service = ServiceBuilder::new().layer(layer).service(handler);
/// ```
#[derive(Clone)]
pub struct InvocationEventLayer {
    dataset: String,
    tracer_provider: Option<SdkTracerProvider>,
    flush_on_end: bool,
}

impl InvocationEventLayer {
    /// Creates a layer with no tracer provider and flushing enabled.
    pub fn new(dataset: impl Into<String>) -> Self {
        Self::builder(dataset).build()
    }

    /// Creates a builder for more detailed configuration.
    pub fn builder(dataset: impl Into<String>) -> InvocationEventLayerBuilder {
        InvocationEventLayerBuilder {
            dataset: dataset.into(),
            tracer_provider: None,
            flush_on_end: true,
        }
    }
}

impl<S> Layer<S> for InvocationEventLayer {
    type Service = InvocationEventService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        InvocationEventService::new(
            inner,
            self.dataset.clone(),
            self.tracer_provider.clone(),
            self.flush_on_end,
        )
    }
}

/// Builder for [`InvocationEventLayer`].
#[must_use = "builders do nothing unless .build() is called"]
pub struct InvocationEventLayerBuilder {
    dataset: String,
    tracer_provider: Option<SdkTracerProvider>,
    flush_on_end: bool,
}

impl InvocationEventLayerBuilder {
    /// Sets the provider flushed after each invocation.
    pub fn tracer_provider(mut self, provider: SdkTracerProvider) -> Self {
        self.tracer_provider = Some(provider);
        self
    }

    /// Sets whether to flush after each invocation.
    ///
    /// Default: `true`. Lambda may freeze the process as soon as the response
    /// is returned, so events still buffered at that point can be lost.
    pub fn flush_on_end(mut self, flush: bool) -> Self {
        self.flush_on_end = flush;
        self
    }

    /// Builds the configured layer.
    pub fn build(self) -> InvocationEventLayer {
        InvocationEventLayer {
            dataset: self.dataset,
            tracer_provider: self.tracer_provider,
            flush_on_end: self.flush_on_end,
        }
    }
}
