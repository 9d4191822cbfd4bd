use crate::span::SpanContext;
use crate::tracer::{StartSpanOptions, Tracer};
use eyre::Result;

/// Tracer that records nothing. Contexts it hands out still nest, so code
/// running without a tracing backend behaves exactly like code with one.
pub struct NoopTracer {}

impl NoopTracer {
    pub fn new() -> NoopTracer {
        Self {}
    }
}

impl Default for NoopTracer {
    fn default() -> NoopTracer {
        NoopTracer::new()
    }
}

impl Tracer for NoopTracer {
    fn start_span(&self, _operation_name: &str, options: StartSpanOptions) -> Result<SpanContext> {
        Ok(match options.parent {
            Some(parent) => SpanContext::new(parent.trace_id(), 0),
            None => SpanContext::new(0, 0),
        })
    }

    fn finish_span(&self, _span: &SpanContext) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_keeps_parent_trace_id() {
        let tracer = NoopTracer::new();
        let options = StartSpanOptions {
            parent: Some(SpanContext::new(42, 7)),
            ..Default::default()
        };
        let child = tracer.start_span("anything", options).unwrap();
        assert_eq!(child.trace_id(), 42);
        tracer.finish_span(&child).unwrap();
    }
}
