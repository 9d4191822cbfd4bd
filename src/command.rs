use crate::context;
use crate::executor::{CommandExecutor, IsolationConfig};
use crate::span::SpanContext;
use crate::tracer::{Scope, StartSpanOptions, Tracer};
use eyre::{eyre, Result};
use serde_json::Value;
use std::sync::Arc;

/// Stable name of a command. Doubles as the operation name of the span
/// recorded around each execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandKey(String);

impl CommandKey {
    pub fn new(name: &str) -> Result<CommandKey> {
        if name.is_empty() {
            return Err(eyre!("command key must not be empty"));
        }
        Ok(CommandKey(String::from(name)))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Wraps units of work so that the span active at submission time is active
/// again on whichever thread actually runs the work, with a child span named
/// after the command opened around each run.
///
/// Construction captures the submitting thread's current span (the "stored
/// span"). The executor may later run the work on a worker whose own span
/// state starts empty; the stored span is re-installed there for the
/// duration of the work and torn down afterwards. Each `execute` call gets
/// its own fresh child span, even on the same command instance.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct TracedCommand<E>
where
    E: CommandExecutor,
{
    #[derivative(Debug = "ignore")]
    tracer: Arc<dyn Tracer>,
    #[derivative(Debug = "ignore")]
    executor: E,
    key: CommandKey,
    config: IsolationConfig,
    stored_span: Option<SpanContext>,
}

impl<E> TracedCommand<E>
where
    E: CommandExecutor,
{
    /// Captures the caller's current span. Beyond that read there are no
    /// side effects; nothing is traced until `execute`.
    pub fn new(tracer: Arc<dyn Tracer>, executor: E, key: CommandKey) -> TracedCommand<E> {
        TracedCommand::with_config(tracer, executor, key, IsolationConfig::default())
    }

    pub fn with_config(
        tracer: Arc<dyn Tracer>,
        executor: E,
        key: CommandKey,
        config: IsolationConfig,
    ) -> TracedCommand<E> {
        let stored_span = context::current_span();
        Self {
            tracer,
            executor,
            key,
            config,
            stored_span,
        }
    }

    /// Overrides the captured span with an explicitly passed context, for
    /// callers that thread their trace context through calls instead of
    /// relying on thread-local discovery.
    pub fn parented(mut self, parent: SpanContext) -> TracedCommand<E> {
        self.stored_span = Some(parent);
        self
    }

    pub fn key(&self) -> &CommandKey {
        &self.key
    }

    pub fn config(&self) -> &IsolationConfig {
        &self.config
    }

    /// Runs `work` through the executor, with the isolation settings
    /// forwarded unchanged. On the thread that ends up doing the run, in
    /// order: a child span named after the command key is started under the
    /// stored span, the stored span is made current, the work runs, the
    /// thread's previous context is restored, and the child span is
    /// finished. The last two hold on every exit path, panics included, and
    /// all of it happens before the outcome reaches the caller.
    ///
    /// The outcome itself passes through untouched: success and error are
    /// exactly what `work` produced. A tracer failure while finishing the
    /// span is logged and suppressed so it never masks that outcome.
    pub fn execute<R, W>(&self, work: W) -> Result<R>
    where
        W: FnOnce() -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let tracer = Arc::clone(&self.tracer);
        let key = self.key.clone();
        let stored_span = self.stored_span;
        let tags = isolation_tags(&self.config);

        self.executor.run(&self.config, move || {
            let child = tracer.start_span(
                key.name(),
                StartSpanOptions {
                    parent: stored_span,
                    tags,
                    ..Default::default()
                },
            )?;
            // drop order: the context guard restores the worker first, then
            // the scope finishes the child span, then the outcome returns
            let _scope = Scope::enter(tracer, child);
            let _context = context::activate(stored_span);
            work()
        })
    }
}

fn isolation_tags(config: &IsolationConfig) -> Vec<(String, Value)> {
    let mut tags = Vec::new();
    if let Some(group) = &config.group {
        tags.push((String::from("command.group"), Value::from(group.as_str())));
    }
    if let Some(pool) = &config.thread_pool {
        tags.push((
            String::from("command.thread_pool"),
            Value::from(pool.as_str()),
        ));
    }
    if let Some(timeout) = config.execution_timeout {
        tags.push((
            String::from("command.timeout_ms"),
            Value::from(timeout.as_millis() as u64),
        ));
    }
    tags
}
