use complaints_rs_store::{Span, Tracer};
use parking_lot::Mutex;
use std::sync::Arc;

/// Tracer that records `start:<op>` and `end:<op>` events in order.
#[derive(Clone, Default)]
pub struct RecordingTracer {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    /// Operations whose span was both started and ended.
    pub fn completed(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| event.strip_prefix("end:").map(str::to_string))
            .collect()
    }
}

impl Tracer for RecordingTracer {
    fn start(&self, operation: &'static str) -> Box<dyn Span> {
        self.events.lock().push(format!("start:{operation}"));
        Box::new(RecordingSpan {
            operation,
            events: Arc::clone(&self.events),
        })
    }
}

struct RecordingSpan {
    operation: &'static str,
    events: Arc<Mutex<Vec<String>>>,
}

impl Span for RecordingSpan {
    fn end(self: Box<Self>) {
        self.events.lock().push(format!("end:{}", self.operation));
    }
}
