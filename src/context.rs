use crate::span::SpanContext;
use std::cell::RefCell;

thread_local! {
    static CURRENT_SPAN: RefCell<Option<SpanContext>> = RefCell::new(None);
}

/// Reads the span currently active on this thread, if any. A freshly
/// spawned thread has none until something activates one.
pub fn current_span() -> Option<SpanContext> {
    CURRENT_SPAN.with(|current| *current.borrow())
}

/// Installs `span` as this thread's active span. The previous value comes
/// back when the returned guard drops, so a worker is never left with stale
/// context for unrelated later work.
pub fn activate(span: Option<SpanContext>) -> ContextGuard {
    let previous = CURRENT_SPAN.with(|current| current.replace(span));
    ContextGuard { previous }
}

/// Restores the span that was active before the matching `activate` call.
pub struct ContextGuard {
    previous: Option<SpanContext>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT_SPAN.with(|current| {
            *current.borrow_mut() = previous;
        });
    }
}
