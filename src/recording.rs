use crate::span::{SpanContext, SpanData};
use crate::time_point::TimePoint;
use crate::tracer::{StartSpanOptions, Tracer};
use eyre::{eyre, Result};
use std::sync::Mutex;

/// In-memory tracer. Keeps every span it started so tests and local tooling
/// can assert on exactly what was opened, finished, and tagged.
///
/// Span ids are sequential starting at 1. A root span's trace id is its own
/// span id; children inherit the parent's trace id.
pub struct RecordingTracer {
    state: Mutex<RecordingState>,
}

struct RecordingState {
    next_id: u64,
    spans: Vec<SpanData>,
}

impl RecordingTracer {
    pub fn new() -> RecordingTracer {
        Self {
            state: Mutex::new(RecordingState {
                next_id: 1,
                spans: Vec::new(),
            }),
        }
    }

    /// Snapshot of every span started so far, open or finished.
    pub fn spans(&self) -> Result<Vec<SpanData>> {
        let state = self.state.lock().map_err(|_| eyre!("mutex lock failed"))?;

        Ok(state.spans.clone())
    }

    pub fn finished_spans(&self) -> Result<Vec<SpanData>> {
        let state = self.state.lock().map_err(|_| eyre!("mutex lock failed"))?;

        Ok(state
            .spans
            .iter()
            .filter(|span| span.is_finished())
            .cloned()
            .collect())
    }
}

impl Default for RecordingTracer {
    fn default() -> RecordingTracer {
        RecordingTracer::new()
    }
}

impl Tracer for RecordingTracer {
    fn start_span(&self, operation_name: &str, options: StartSpanOptions) -> Result<SpanContext> {
        let mut state = self.state.lock().map_err(|_| eyre!("mutex lock failed"))?;

        let span_id = state.next_id;
        state.next_id += 1;
        let (trace_id, parent_id) = match options.parent {
            Some(parent) => (parent.trace_id(), parent.span_id()),
            None => (span_id, 0),
        };
        state.spans.push(SpanData {
            name: String::from(operation_name),
            trace_id,
            span_id,
            parent_id,
            start: options.start_time,
            duration: None,
            tags: options.tags.into_iter().collect(),
        });

        Ok(SpanContext::new(trace_id, span_id))
    }

    fn finish_span(&self, span: &SpanContext) -> Result<()> {
        let mut state = self.state.lock().map_err(|_| eyre!("mutex lock failed"))?;

        let data = state
            .spans
            .iter_mut()
            .find(|data| data.span_id == span.span_id())
            .ok_or_else(|| eyre!("finish for unknown span {}", span.span_id()))?;
        if data.is_finished() {
            return Err(eyre!("span {} finished twice", span.span_id()));
        }
        data.duration = Some(TimePoint::new().relative_time - data.start.relative_time);

        Ok(())
    }
}
