use crate::time_point::TimePoint;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// SpanContext is the part of a span's state that propagates to descendant
/// spans and across thread boundaries: a <trace_id, span_id> pair. It is
/// read-only once captured, so it can be handed to a worker thread freely.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpanContext {
    trace_id: u64,
    span_id: u64,
}

impl SpanContext {
    pub fn new(trace_id: u64, span_id: u64) -> SpanContext {
        Self { trace_id, span_id }
    }

    pub fn trace_id(&self) -> u64 {
        self.trace_id
    }

    pub fn span_id(&self) -> u64 {
        self.span_id
    }
}

/// Everything a tracer records about one span. `parent_id` is zero for root
/// spans. `duration` stays `None` while the span is open.
#[derive(Clone, Debug)]
pub struct SpanData {
    pub name: String,
    pub trace_id: u64,
    pub span_id: u64,
    pub parent_id: u64,
    pub start: TimePoint,
    pub duration: Option<Duration>,
    pub tags: HashMap<String, Value>,
}

impl SpanData {
    pub fn context(&self) -> SpanContext {
        SpanContext::new(self.trace_id, self.span_id)
    }

    pub fn is_finished(&self) -> bool {
        self.duration.is_some()
    }
}
