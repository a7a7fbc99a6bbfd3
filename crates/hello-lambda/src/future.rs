//! Future that closes the invocation span and flushes telemetry.

use opentelemetry_sdk::trace::SdkTracerProvider;
use pin_project::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, ready};
use tracing::Span;

/// Polls the handler inside its span, then records the outcome, closes the
/// span and optionally flushes before yielding the result.
///
/// The span must be closed before flushing: spans are only exported once
/// they end.
#[pin_project]
pub struct InvocationEventFuture<F> {
    #[pin]
    inner: F,
    span: Option<Span>,
    tracer_provider: Option<SdkTracerProvider>,
    flush_on_end: bool,
}

impl<F> InvocationEventFuture<F> {
    pub(crate) fn new(
        inner: F,
        span: Span,
        tracer_provider: Option<SdkTracerProvider>,
        flush_on_end: bool,
    ) -> Self {
        Self {
            inner,
            span: Some(span),
            tracer_provider,
            flush_on_end,
        }
    }
}

impl<F, T, E> Future for InvocationEventFuture<F>
where
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        let result = match this.span.as_ref() {
            Some(span) => {
                let _entered = span.enter();
                ready!(this.inner.poll(cx))
            }
            None => ready!(this.inner.poll(cx)),
        };

        if let Some(span) = this.span.take() {
            match &result {
                Ok(_) => {
                    span.record("otel.status_code", "OK");
                }
                Err(e) => {
                    span.record("otel.status_code", "ERROR");
                    span.record("error.message", e.to_string().as_str());
                }
            }
        }

        if *this.flush_on_end
            && let Some(provider) = this.tracer_provider.take()
            && let Err(e) = provider.force_flush()
        {
            tracing::warn!(target: "telemetry_lifecycle", error = %e, "Failed to flush telemetry after invocation");
        }

        Poll::Ready(result)
    }
}
