use eyre::{eyre, Result};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Isolation settings handed through to the executor verbatim. The command
/// wrapper gives them no meaning of its own.
#[derive(Clone, Debug, Default)]
pub struct IsolationConfig {
    /// Logical grouping of related commands, typically one per downstream
    /// dependency.
    pub group: Option<String>,
    /// Name of the dedicated pool the work should run on, for executors
    /// that keep one per group.
    pub thread_pool: Option<String>,
    /// Upper bound on how long the executor waits for the work.
    pub execution_timeout: Option<Duration>,
}

/// The execution side of a command: something that can run a unit of work,
/// possibly on a different thread than the submitting one, under the given
/// isolation settings.
pub trait CommandExecutor {
    fn run<R, W>(&self, config: &IsolationConfig, work: W) -> Result<R>
    where
        W: FnOnce() -> Result<R> + Send + 'static,
        R: Send + 'static;
}

/// Runs work inline on the submitting thread. Isolation settings have
/// nothing to act on here.
pub struct CallerExecutor {}

impl CallerExecutor {
    pub fn new() -> CallerExecutor {
        Self {}
    }
}

impl Default for CallerExecutor {
    fn default() -> CallerExecutor {
        CallerExecutor::new()
    }
}

impl CommandExecutor for CallerExecutor {
    fn run<R, W>(&self, _config: &IsolationConfig, work: W) -> Result<R>
    where
        W: FnOnce() -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        work()
    }
}

/// Runs each unit of work on a freshly spawned thread and waits for its
/// outcome. `execution_timeout` is enforced from the waiting side: on
/// timeout the caller gets an error while the worker runs to completion.
pub struct IsolatedThreadExecutor {}

impl IsolatedThreadExecutor {
    pub fn new() -> IsolatedThreadExecutor {
        Self {}
    }
}

impl Default for IsolatedThreadExecutor {
    fn default() -> IsolatedThreadExecutor {
        IsolatedThreadExecutor::new()
    }
}

impl CommandExecutor for IsolatedThreadExecutor {
    fn run<R, W>(&self, config: &IsolationConfig, work: W) -> Result<R>
    where
        W: FnOnce() -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            // the receiver may be gone already if the caller timed out
            let _ = sender.send(work());
        });

        match config.execution_timeout {
            Some(timeout) => receiver.recv_timeout(timeout).map_err(|err| match err {
                mpsc::RecvTimeoutError::Timeout => {
                    eyre!("work did not finish within {:?}", timeout)
                }
                mpsc::RecvTimeoutError::Disconnected => {
                    eyre!("worker terminated without an outcome")
                }
            })?,
            None => receiver
                .recv()
                .map_err(|_| eyre!("worker terminated without an outcome"))?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::ThreadId;

    #[test]
    fn caller_executor_runs_inline() {
        let executor = CallerExecutor::new();
        let submitting = thread::current().id();
        let ran_on: ThreadId = executor
            .run(&IsolationConfig::default(), || Ok(thread::current().id()))
            .unwrap();
        assert_eq!(ran_on, submitting);
    }

    #[test]
    fn isolated_executor_hops_threads() {
        let executor = IsolatedThreadExecutor::new();
        let submitting = thread::current().id();
        let ran_on: ThreadId = executor
            .run(&IsolationConfig::default(), || Ok(thread::current().id()))
            .unwrap();
        assert_ne!(ran_on, submitting);
    }

    #[test]
    fn isolated_executor_enforces_timeout() {
        let executor = IsolatedThreadExecutor::new();
        let config = IsolationConfig {
            execution_timeout: Some(Duration::from_millis(20)),
            ..Default::default()
        };
        let result: Result<u32> = executor.run(&config, || {
            thread::sleep(Duration::from_millis(500));
            Ok(1)
        });
        assert!(result.unwrap_err().to_string().contains("did not finish"));
    }

    #[test]
    fn work_error_passes_through() {
        let executor = IsolatedThreadExecutor::new();
        let result: Result<u32> = executor.run(&IsolationConfig::default(), || {
            Err(eyre!("downstream unavailable"))
        });
        assert_eq!(result.unwrap_err().to_string(), "downstream unavailable");
    }

    #[test]
    fn worker_panic_reported_as_error() {
        let executor = IsolatedThreadExecutor::new();
        let result: Result<u32> =
            executor.run(&IsolationConfig::default(), || panic!("worker blew up"));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("without an outcome"));
    }
}
