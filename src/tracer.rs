use crate::span::SpanContext;
use crate::time_point::TimePoint;
use eyre::Result;
use serde_json::Value;
use std::sync::Arc;

/// StartSpanOptions allows Tracer::start_span() callers a mechanism to
/// override the start timestamp, pick an explicit parent, and make tags
/// available at span start time.
pub struct StartSpanOptions {
    pub start_time: TimePoint,
    /// Parent for the new span. If `None`, start a "root" span (i.e. start
    /// a new trace).
    pub parent: Option<SpanContext>,
    /// Zero or more tags to apply to the newly created span.
    pub tags: Vec<(String, Value)>,
}

impl Default for StartSpanOptions {
    fn default() -> StartSpanOptions {
        StartSpanOptions {
            start_time: TimePoint::new(),
            parent: None,
            tags: Vec::new(),
        }
    }
}

/// Tracer is a simple, thin interface for span creation. Implementations
/// must be callable from whichever worker thread ends up running traced
/// work, hence the `Send + Sync` bound.
pub trait Tracer: Send + Sync {
    /// Create and start a new span with the given `operation_name`.
    fn start_span(&self, operation_name: &str, options: StartSpanOptions) -> Result<SpanContext>;

    /// End the span. Called exactly once for every started span.
    fn finish_span(&self, span: &SpanContext) -> Result<()>;
}

/// Scope ties a started span to a region of code: dropping the scope
/// finishes the span. A finish failure during drop is logged rather than
/// surfaced, so tracer trouble never replaces the outcome of the work the
/// span was measuring.
pub struct Scope {
    tracer: Arc<dyn Tracer>,
    span: Option<SpanContext>,
}

impl Scope {
    pub fn enter(tracer: Arc<dyn Tracer>, span: SpanContext) -> Scope {
        Self {
            tracer,
            span: Some(span),
        }
    }

    pub fn span(&self) -> Option<SpanContext> {
        self.span
    }

    /// Finishes the span now instead of at drop, surfacing any tracer
    /// error to the caller.
    pub fn close(mut self) -> Result<()> {
        match self.span.take() {
            Some(span) => self.tracer.finish_span(&span),
            None => Ok(()),
        }
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        if let Some(span) = self.span.take() {
            if let Err(err) = self.tracer.finish_span(&span) {
                tracing::warn!("failed to finish span {}: {}", span.span_id(), err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingTracer;

    #[test]
    fn drop_finishes_span() {
        let tracer = Arc::new(RecordingTracer::new());
        let span = tracer
            .start_span("scoped", StartSpanOptions::default())
            .unwrap();
        {
            let _scope = Scope::enter(tracer.clone(), span);
        }
        let spans = tracer.spans().unwrap();
        assert_eq!(spans.len(), 1);
        assert!(spans[0].is_finished());
    }

    #[test]
    fn explicit_close_finishes_once() {
        let tracer = Arc::new(RecordingTracer::new());
        let span = tracer
            .start_span("scoped", StartSpanOptions::default())
            .unwrap();
        let scope = Scope::enter(tracer.clone(), span);
        scope.close().unwrap();
        // the drop running inside close() must not finish it a second time
        let spans = tracer.spans().unwrap();
        assert_eq!(spans.len(), 1);
        assert!(spans[0].is_finished());
    }

    #[test]
    fn close_surfaces_unknown_span() {
        let tracer = Arc::new(RecordingTracer::new());
        let scope = Scope::enter(tracer, SpanContext::new(1, 99));
        assert!(scope.close().is_err());
    }
}
