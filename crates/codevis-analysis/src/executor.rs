//! Concurrent tool executor.
//!
//! Runs one frontend action per translation unit on a bounded rayon pool.
//! Failures and panics are collected and reported together once every task
//! has finished; they never stop sibling tasks. Cancellation skips tasks that
//! have not started yet.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use codevis_core::errors::{ExecutorError, ScanError};
use codevis_core::tracing::metrics;
use codevis_core::{Cancellable, CancellationToken, Diagnostics};
use rayon::prelude::*;
use tracing::{info, info_span};

use crate::compile_db::{CompilationDatabase, CompileCommand};

/// Work done for one translation unit.
pub trait FrontendAction: Send + Sync {
    fn run(&self, command: &CompileCommand) -> Result<(), ScanError>;
}

impl<F> FrontendAction for F
where
    F: Fn(&CompileCommand) -> Result<(), ScanError> + Send + Sync,
{
    fn run(&self, command: &CompileCommand) -> Result<(), ScanError> {
        self(command)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Not started because the run was cancelled.
    pub skipped: usize,
}

pub struct ToolExecutor {
    threads: usize,
    diagnostics: Arc<Diagnostics>,
    cancel: CancellationToken,
}

impl ToolExecutor {
    /// `threads` of zero is treated as one.
    pub fn new(threads: usize, diagnostics: Arc<Diagnostics>) -> Self {
        Self {
            threads: threads.max(1),
            diagnostics,
            cancel: CancellationToken::new(),
        }
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Stops tasks that have not started yet. Running tasks finish normally.
    /// The flag is cleared when the current run returns.
    pub fn cancel_run(&self) {
        self.cancel.cancel();
    }

    /// Handle observing the same cancellation flag.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Blocks until every task has run or been skipped.
    pub fn execute(
        &self,
        database: &CompilationDatabase,
        action: &dyn FrontendAction,
    ) -> Result<ExecutionSummary, ExecutorError> {
        let commands = database.commands();
        let total = commands.len();
        let _span = info_span!("execute", { metrics::TRANSLATION_UNITS } = total, { metrics::THREAD_COUNT } = self.threads)
            .entered();
        let start = Instant::now();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
            .map_err(|e| ExecutorError::PoolBuild { message: e.to_string() })?;

        let succeeded = AtomicUsize::new(0);
        let skipped = AtomicUsize::new(0);
        let errors: Mutex<Vec<String>> = Mutex::new(Vec::new());

        pool.install(|| {
            commands.par_iter().for_each(|command| {
                if self.cancel.is_cancelled() {
                    skipped.fetch_add(1, Ordering::Relaxed);
                    return;
                }
                self.diagnostics
                    .debug(|| format!("Processing file {}", command.file.display()));

                let outcome = catch_unwind(AssertUnwindSafe(|| action.run(command)));
                let failure = match outcome {
                    Ok(Ok(())) => None,
                    Ok(Err(e)) => Some(e.to_string()),
                    Err(payload) => Some(format!("panicked: {}", panic_message(payload.as_ref()))),
                };
                match failure {
                    None => {
                        succeeded.fetch_add(1, Ordering::Relaxed);
                    }
                    Some(reason) => {
                        let message = format!("Failed to run action on {}", command.file.display());
                        self.diagnostics.warn(&format!("{message}: {reason}"));
                        errors
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push(message);
                    }
                }
            });
        });

        // A cancel that lands after the last task started still ends this run,
        // and never leaks into the next one.
        let cancelled = self.cancel.is_cancelled();
        self.cancel.reset();

        let errors = errors.into_inner().unwrap_or_else(PoisonError::into_inner);
        let summary = ExecutionSummary {
            total,
            succeeded: succeeded.load(Ordering::Relaxed),
            failed: errors.len(),
            skipped: skipped.load(Ordering::Relaxed),
        };
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "executor finished"
        );

        if cancelled || summary.skipped > 0 {
            return Err(ExecutorError::Cancelled {
                completed: summary.succeeded + summary.failed,
                total,
            });
        }
        if !errors.is_empty() {
            let mut message = String::new();
            for error in &errors {
                message.push_str(error);
                message.push('\n');
            }
            return Err(ExecutorError::TasksFailed {
                failed: summary.failed,
                total,
                message,
            });
        }
        Ok(summary)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database(n: usize) -> CompilationDatabase {
        CompilationDatabase::from_commands(
            (0..n)
                .map(|i| CompileCommand::new("/build", format!("/src/file{i}.cpp"), vec!["c++".into()]))
                .collect(),
        )
    }

    #[test]
    fn every_task_runs_once() {
        let executor = ToolExecutor::new(4, Arc::new(Diagnostics::new()));
        let seen = Mutex::new(Vec::new());
        let action = |cmd: &CompileCommand| -> Result<(), ScanError> {
            seen.lock().unwrap().push(cmd.file.clone());
            Ok(())
        };
        let summary = executor.execute(&database(20), &action).unwrap();
        assert_eq!(summary.succeeded, 20);

        let mut seen = seen.into_inner().unwrap();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 20);
    }

    #[test]
    fn failures_and_panics_are_aggregated() {
        let executor = ToolExecutor::new(2, Arc::new(Diagnostics::new()));
        let action = |cmd: &CompileCommand| -> Result<(), ScanError> {
            let name = cmd.file.to_string_lossy().into_owned();
            if name.ends_with("file1.cpp") {
                return Err(ScanError::ParserError {
                    path: cmd.file.clone(),
                    message: "bad".into(),
                });
            }
            if name.ends_with("file2.cpp") {
                panic!("third-party failure");
            }
            Ok(())
        };
        let err = executor.execute(&database(5), &action).unwrap_err();
        match err {
            ExecutorError::TasksFailed { failed, total, message } => {
                assert_eq!((failed, total), (2, 5));
                assert!(message.contains("Failed to run action on /src/file1.cpp\n"));
                assert!(message.contains("Failed to run action on /src/file2.cpp\n"));
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn cancelling_skips_tasks_not_yet_started() {
        let executor = ToolExecutor::new(1, Arc::new(Diagnostics::new()));
        let token = executor.cancellation_token();
        let ran = AtomicUsize::new(0);
        let action = |_: &CompileCommand| -> Result<(), ScanError> {
            ran.fetch_add(1, Ordering::SeqCst);
            token.cancel();
            Ok(())
        };
        let err = executor.execute(&database(10), &action).unwrap_err();
        assert!(matches!(err, ExecutorError::Cancelled { completed: 1, total: 10 }));
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancel_during_the_last_task_ends_only_that_run() {
        let executor = ToolExecutor::new(1, Arc::new(Diagnostics::new()));
        let token = executor.cancellation_token();
        let action = |_: &CompileCommand| -> Result<(), ScanError> {
            token.cancel();
            Ok(())
        };
        let err = executor.execute(&database(1), &action).unwrap_err();
        assert!(matches!(err, ExecutorError::Cancelled { completed: 1, total: 1 }));
        assert!(!token.is_cancelled());

        let ok = |_: &CompileCommand| -> Result<(), ScanError> { Ok(()) };
        let summary = executor.execute(&database(3), &ok).unwrap();
        assert_eq!((summary.succeeded, summary.skipped), (3, 0));
    }

    #[test]
    fn zero_threads_means_one() {
        let executor = ToolExecutor::new(0, Arc::new(Diagnostics::new()));
        assert_eq!(executor.threads(), 1);
        let summary = executor
            .execute(&CompilationDatabase::new(), &|_: &CompileCommand| -> Result<(), ScanError> { Ok(()) })
            .unwrap();
        assert_eq!(summary, ExecutionSummary::default());
    }
}
