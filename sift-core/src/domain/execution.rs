//! Execution result types
//!
//! An [`ExecutionResult`] is the only thing callers of the runner see of a
//! worker process. Raw stdout and stderr travel inside it as captured text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a worker invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// Process exited on its own with an exit code
    Exited { code: i32 },
    /// Process was killed by a signal it did not ask for
    Terminated,
    /// Process outlived its timeout and was killed
    TimedOut,
    /// Process could not be launched at all
    SpawnFailed { message: String },
}

/// Failure taxonomy for a stage that did not succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    SpawnError,
    WorkerFailure,
    TimeoutExceeded,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::SpawnError => "spawn_error",
            FailureKind::WorkerFailure => "worker_failure",
            FailureKind::TimeoutExceeded => "timeout_exceeded",
        }
    }
}

/// Outcome and captured output of one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    stage: String,
    outcome: StageOutcome,
    stdout: String,
    stderr: String,
    started_at: DateTime<Utc>,
    elapsed: Duration,
}

impl ExecutionResult {
    /// Creates a result stamped with the current time and zero elapsed time
    ///
    /// Executors that measure timing should chain [`ExecutionResult::with_timing`].
    pub fn new(
        stage: impl Into<String>,
        outcome: StageOutcome,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            stage: stage.into(),
            outcome,
            stdout: stdout.into(),
            stderr: stderr.into(),
            started_at: Utc::now(),
            elapsed: Duration::ZERO,
        }
    }

    /// Result for a worker that could not be launched
    pub fn spawn_failed(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            stage,
            StageOutcome::SpawnFailed {
                message: message.into(),
            },
            String::new(),
            String::new(),
        )
    }

    pub fn with_timing(mut self, started_at: DateTime<Utc>, elapsed: Duration) -> Self {
        self.started_at = started_at;
        self.elapsed = elapsed;
        self
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    pub fn outcome(&self) -> &StageOutcome {
        &self.outcome
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// True only for a clean exit with code zero
    pub fn success(&self) -> bool {
        matches!(self.outcome, StageOutcome::Exited { code: 0 })
    }

    pub fn timeout_exceeded(&self) -> bool {
        matches!(self.outcome, StageOutcome::TimedOut)
    }

    pub fn is_spawn_error(&self) -> bool {
        matches!(self.outcome, StageOutcome::SpawnFailed { .. })
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self.outcome {
            StageOutcome::Exited { code } => Some(code),
            _ => None,
        }
    }

    /// Classifies a failed result, `None` when the stage succeeded
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match &self.outcome {
            StageOutcome::Exited { code: 0 } => None,
            StageOutcome::Exited { .. } | StageOutcome::Terminated => {
                Some(FailureKind::WorkerFailure)
            }
            StageOutcome::TimedOut => Some(FailureKind::TimeoutExceeded),
            StageOutcome::SpawnFailed { .. } => Some(FailureKind::SpawnError),
        }
    }

    /// Diagnostic text for a failed stage
    ///
    /// This is the captured stderr verbatim. A spawn failure never produced any
    /// stderr, so its launch error message is used instead.
    pub fn failure_reason(&self) -> Option<&str> {
        if self.success() {
            return None;
        }
        match &self.outcome {
            StageOutcome::SpawnFailed { message } if self.stderr.is_empty() => {
                Some(message.as_str())
            }
            _ => Some(self.stderr.as_str()),
        }
    }
}
