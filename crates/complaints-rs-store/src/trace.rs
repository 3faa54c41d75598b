//! Span capability injected into storage components.

use log::debug;
use std::time::Instant;

/// Starts spans around storage operations.
pub trait Tracer: Send + Sync {
    /// Open a span for the named operation.
    fn start(&self, operation: &'static str) -> Box<dyn Span>;
}

/// A running span; ending it records completion.
pub trait Span: Send {
    /// Close the span.
    fn end(self: Box<Self>);
}

/// Tracer that reports span timings through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTracer;

impl Tracer for LogTracer {
    fn start(&self, operation: &'static str) -> Box<dyn Span> {
        debug!("span start (operation={operation})");
        Box::new(LogSpan {
            operation,
            started: Instant::now(),
        })
    }
}

struct LogSpan {
    operation: &'static str,
    started: Instant,
}

impl Span for LogSpan {
    fn end(self: Box<Self>) {
        debug!(
            "span end (operation={}, elapsed_us={})",
            self.operation,
            self.started.elapsed().as_micros()
        );
    }
}

/// Tracer that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl Tracer for NoopTracer {
    fn start(&self, _operation: &'static str) -> Box<dyn Span> {
        Box::new(NoopSpan)
    }
}

struct NoopSpan;

impl Span for NoopSpan {
    fn end(self: Box<Self>) {}
}
