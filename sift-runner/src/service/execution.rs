//! Stage execution service
//!
//! Handles one worker invocation:
//! - Launching the worker as a child process
//! - Draining stdout and stderr while it runs
//! - Killing it when the stage timeout elapses
//!
//! The stage ends when the worker exits. Its pipes then get a short grace period to
//! reach EOF; output written later by leftover background processes is lost.
//!
//! The child is spawned with `kill_on_drop`, so it is also terminated if the
//! calling future is dropped before the stage completes.

use async_trait::async_trait;
use sift_core::domain::execution::{ExecutionResult, StageOutcome};
use sift_core::domain::stage::StageSpec;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};
use tracing::{error, info, warn};

use crate::service::output::{OutputBuffer, Stream, drain};

/// How long output pipes may stay open after the worker itself has exited
const PIPE_GRACE: Duration = Duration::from_millis(500);

/// Service trait for executing a single stage
#[async_trait]
pub trait StageExecutor: Send + Sync {
    /// Runs the stage to completion
    ///
    /// Never returns an error: launch failures, worker failures and timeouts
    /// are all reported through the returned [`ExecutionResult`].
    async fn execute(&self, spec: &StageSpec) -> ExecutionResult;
}

/// Executor that runs each stage as a local child process
#[derive(Debug, Clone, Default)]
pub struct ProcessStageExecutor {}

impl ProcessStageExecutor {
    pub fn new() -> Self {
        Self {}
    }

    fn spawn_worker(spec: &StageSpec) -> std::io::Result<Child> {
        Command::new(spec.program())
            .args(spec.args())
            .current_dir(spec.working_dir())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
    }

    /// Kills the worker and reaps it so no zombie is left behind
    async fn terminate(child: &mut Child, stage: &str) {
        let pid = child.id();
        match child.kill().await {
            Ok(()) => info!("Worker for stage '{}' (pid {:?}) terminated", stage, pid),
            Err(e) => warn!(
                "Failed to terminate worker for stage '{}' (pid {:?}): {}",
                stage, pid, e
            ),
        }
    }
}

#[async_trait]
impl StageExecutor for ProcessStageExecutor {
    async fn execute(&self, spec: &StageSpec) -> ExecutionResult {
        let started_at = chrono::Utc::now();
        let clock = Instant::now();

        info!(
            "Launching worker for stage '{}': {} (cwd: {}, timeout: {:?})",
            spec.name(),
            spec.command_line(),
            spec.working_dir().display(),
            spec.timeout()
        );

        let mut child = match Self::spawn_worker(spec) {
            Ok(child) => child,
            Err(e) => {
                error!("Failed to launch worker for stage '{}': {}", spec.name(), e);
                return ExecutionResult::spawn_failed(
                    spec.name(),
                    format!("failed to launch '{}': {}", spec.program(), e),
                )
                .with_timing(started_at, clock.elapsed());
            }
        };

        let mut stdout = OutputBuffer::new();
        let mut stderr = OutputBuffer::new();
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();

        let outcome = {
            let mut drains = Box::pin(async {
                tokio::join!(
                    drain(stdout_pipe, &mut stdout, spec.name(), Stream::Stdout),
                    drain(stderr_pipe, &mut stderr, spec.name(), Stream::Stderr),
                )
            });
            let mut reads = None;

            let waited = tokio::time::timeout(spec.timeout(), async {
                tokio::select! {
                    status = child.wait() => status,
                    drained = &mut drains => {
                        reads = Some(drained);
                        child.wait().await
                    }
                }
            })
            .await;

            let outcome = match waited {
                Ok(Ok(status)) => {
                    // A worker may exit while a process it left behind still holds its pipes.
                    if reads.is_none() {
                        match tokio::time::timeout(PIPE_GRACE, &mut drains).await {
                            Ok(drained) => reads = Some(drained),
                            Err(_) => warn!(
                                "Worker for stage '{}' exited but its output is still held open, keeping what was captured",
                                spec.name()
                            ),
                        }
                    }
                    match status.code() {
                        Some(code) => StageOutcome::Exited { code },
                        None => StageOutcome::Terminated,
                    }
                }
                Ok(Err(e)) => {
                    error!("Failed to wait for worker of stage '{}': {}", spec.name(), e);
                    Self::terminate(&mut child, spec.name()).await;
                    StageOutcome::Terminated
                }
                Err(_) => {
                    warn!(
                        "Stage '{}' exceeded its timeout of {:?}, terminating worker",
                        spec.name(),
                        spec.timeout()
                    );
                    Self::terminate(&mut child, spec.name()).await;
                    StageOutcome::TimedOut
                }
            };

            if let Some((stdout_read, stderr_read)) = reads {
                let reads = [(Stream::Stdout, stdout_read), (Stream::Stderr, stderr_read)];
                for (stream, read) in reads {
                    if let Err(e) = read {
                        warn!(
                            "Failed to read {} of stage '{}': {}",
                            stream.as_str(),
                            spec.name(),
                            e
                        );
                    }
                }
            }

            outcome
        };

        let elapsed = clock.elapsed();
        info!(
            "Stage '{}' finished in {:?}: {:?} (stdout: {} bytes, stderr: {} bytes)",
            spec.name(),
            elapsed,
            outcome,
            stdout.len(),
            stderr.len()
        );

        ExecutionResult::new(spec.name(), outcome, stdout.into_text(), stderr.into_text())
            .with_timing(started_at, elapsed)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(name: &str, script: &str) -> StageSpec {
        StageSpec::builder(name, "sh")
            .args(["-c", script])
            .timeout(Duration::from_secs(10))
            .build()
    }

    #[tokio::test]
    async fn test_successful_worker() {
        let executor = ProcessStageExecutor::new();
        let result = executor
            .execute(&shell("collect", "echo 12 reviews saved"))
            .await;

        assert!(result.success());
        assert_eq!(result.stage(), "collect");
        assert_eq!(result.exit_code(), Some(0));
        assert_eq!(result.stdout(), "12 reviews saved\n");
        assert_eq!(result.stderr(), "");
        assert!(!result.timeout_exceeded());
    }

    #[tokio::test]
    async fn test_nonzero_exit_keeps_both_streams() {
        let executor = ProcessStageExecutor::new();
        let result = executor
            .execute(&shell("index", "echo loading; echo disk full >&2; exit 1"))
            .await;

        assert!(!result.success());
        assert!(!result.is_spawn_error());
        assert_eq!(result.exit_code(), Some(1));
        assert_eq!(result.stdout(), "loading\n");
        assert_eq!(result.stderr(), "disk full\n");
    }

    #[tokio::test]
    async fn test_missing_executable_is_spawn_error() {
        let executor = ProcessStageExecutor::new();
        let spec = StageSpec::builder("collect", "/nonexistent/sift-worker").build();

        let result = executor.execute(&spec).await;

        assert!(result.is_spawn_error());
        assert!(!result.success());
        assert_eq!(result.exit_code(), None);
        assert!(
            result
                .failure_reason()
                .unwrap()
                .contains("/nonexistent/sift-worker")
        );
    }

    #[tokio::test]
    async fn test_missing_working_dir_is_spawn_error() {
        let executor = ProcessStageExecutor::new();
        let spec = StageSpec::builder("index", "sh")
            .args(["-c", "true"])
            .working_dir("/nonexistent/ai_core")
            .build();

        let result = executor.execute(&spec).await;

        assert!(result.is_spawn_error());
    }

    #[tokio::test]
    async fn test_working_dir_is_applied() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().canonicalize().unwrap();
        let spec = StageSpec::builder("query", "sh")
            .args(["-c", "pwd -P"])
            .working_dir(&dir)
            .build();

        let result = ProcessStageExecutor::new().execute(&spec).await;

        assert!(result.success());
        assert_eq!(result.stdout().trim(), dir.to_string_lossy());
    }

    #[tokio::test]
    async fn test_killed_by_signal_is_terminated() {
        let executor = ProcessStageExecutor::new();
        let result = executor.execute(&shell("query", "kill -9 $$")).await;

        assert_eq!(result.outcome(), &StageOutcome::Terminated);
        assert!(!result.success());
    }

    #[tokio::test]
    async fn test_large_output_does_not_stall() {
        let executor = ProcessStageExecutor::new();
        let result = executor
            .execute(&shell(
                "collect",
                "head -c 1000000 /dev/zero | tr '\\000' 'a'; head -c 200000 /dev/zero | tr '\\000' 'b' >&2",
            ))
            .await;

        assert!(result.success());
        assert_eq!(result.stdout().len(), 1_000_000);
        assert_eq!(result.stderr().len(), 200_000);
    }

    #[tokio::test]
    async fn test_timeout_kills_worker_and_keeps_partial_output() {
        let executor = ProcessStageExecutor::new();
        let spec = StageSpec::builder("collect", "sh")
            .args(["-c", "echo $$; echo warming up >&2; exec sleep 30"])
            .timeout(Duration::from_millis(300))
            .build();

        let clock = Instant::now();
        let result = executor.execute(&spec).await;

        assert!(result.timeout_exceeded());
        assert!(!result.success());
        assert!(clock.elapsed() < Duration::from_secs(5));
        assert!(result.elapsed() >= Duration::from_millis(300));
        assert_eq!(result.stderr(), "warming up\n");

        #[cfg(target_os = "linux")]
        {
            let pid: u32 = result.stdout().trim().parse().unwrap();
            assert!(!std::path::Path::new(&format!("/proc/{}", pid)).exists());
        }
    }

    #[tokio::test]
    async fn test_exit_ends_stage_while_background_child_holds_stdout() {
        let executor = ProcessStageExecutor::new();
        let spec = StageSpec::builder("collect", "sh")
            .args(["-c", "sleep 3 & echo done; exit 0"])
            .timeout(Duration::from_millis(1500))
            .build();

        let clock = Instant::now();
        let result = executor.execute(&spec).await;

        assert_eq!(result.outcome(), &StageOutcome::Exited { code: 0 });
        assert!(result.success());
        assert!(!result.timeout_exceeded());
        assert_eq!(result.stdout(), "done\n");
        assert!(clock.elapsed() < Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_concurrent_invocations_keep_separate_output() {
        let executor = ProcessStageExecutor::new();
        let first = shell("collect", "for i in 1 2 3; do echo first-$i; sleep 0.05; done");
        let second = shell("collect", "for i in 1 2 3; do echo second-$i; sleep 0.05; done");

        let (a, b) = tokio::join!(executor.execute(&first), executor.execute(&second));

        assert_eq!(a.stdout(), "first-1\nfirst-2\nfirst-3\n");
        assert_eq!(b.stdout(), "second-1\nsecond-2\nsecond-3\n");
    }
}
