#[macro_use]
extern crate derivative;

mod command;
mod context;
mod executor;
mod noop;
mod recording;
mod span;
mod time_point;
mod tracer;

pub use command::{CommandKey, TracedCommand};
pub use context::{activate, current_span, ContextGuard};
pub use executor::{CallerExecutor, CommandExecutor, IsolatedThreadExecutor, IsolationConfig};
pub use noop::NoopTracer;
pub use recording::RecordingTracer;
pub use span::{SpanContext, SpanData};
pub use time_point::TimePoint;
pub use tracer::{Scope, StartSpanOptions, Tracer};
