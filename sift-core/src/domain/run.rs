//! Pipeline run state machine
//!
//! ```text
//! Pending --start--> Running(0) --ok--> Running(1) ... --ok--> Succeeded
//!                        |                  |
//!                        +------fail--------+--> Failed(i, reason)
//! ```
//!
//! A run is created per request and dropped once the response is built.
//! Results are append-only and a failed run never executes another stage.

use thiserror::Error;
use uuid::Uuid;

use super::execution::ExecutionResult;
use super::stage::StageSpec;

/// Lifecycle state of a [`PipelineRun`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Pending,
    Running { stage: usize },
    Succeeded,
    Failed { stage: usize, reason: String },
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Succeeded | RunStatus::Failed { .. })
    }
}

/// Rejected state transitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("pipeline run already started (status: {0:?})")]
    AlreadyStarted(RunStatus),

    #[error("pipeline run is not running (status: {0:?})")]
    NotRunning(RunStatus),

    #[error("result for stage '{actual}' recorded while stage '{expected}' is running")]
    StageMismatch { expected: String, actual: String },
}

/// One end-to-end execution of an ordered stage list
#[derive(Debug)]
pub struct PipelineRun {
    id: Uuid,
    stages: Vec<StageSpec>,
    results: Vec<ExecutionResult>,
    status: RunStatus,
}

impl PipelineRun {
    pub fn new(stages: Vec<StageSpec>) -> Self {
        Self {
            id: Uuid::new_v4(),
            stages,
            results: Vec::new(),
            status: RunStatus::Pending,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    pub fn results(&self) -> &[ExecutionResult] {
        &self.results
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    pub fn is_succeeded(&self) -> bool {
        self.status == RunStatus::Succeeded
    }

    /// Moves a pending run to its first stage
    ///
    /// A run without stages has nothing to fail and succeeds immediately.
    pub fn start(&mut self) -> Result<&RunStatus, RunError> {
        if self.status != RunStatus::Pending {
            return Err(RunError::AlreadyStarted(self.status.clone()));
        }

        self.status = if self.stages.is_empty() {
            RunStatus::Succeeded
        } else {
            RunStatus::Running { stage: 0 }
        };
        Ok(&self.status)
    }

    /// Stage that must execute next, if the run is still in progress
    pub fn current_stage(&self) -> Option<(usize, &StageSpec)> {
        match self.status {
            RunStatus::Running { stage } => self.stages.get(stage).map(|spec| (stage, spec)),
            _ => None,
        }
    }

    /// Appends the result of the running stage and advances the state machine
    pub fn record(&mut self, result: ExecutionResult) -> Result<&RunStatus, RunError> {
        let index = match self.status {
            RunStatus::Running { stage } => stage,
            _ => return Err(RunError::NotRunning(self.status.clone())),
        };

        let expected = self.stages[index].name();
        if result.stage() != expected {
            return Err(RunError::StageMismatch {
                expected: expected.to_string(),
                actual: result.stage().to_string(),
            });
        }

        self.status = match result.failure_reason() {
            Some(reason) => RunStatus::Failed {
                stage: index,
                reason: reason.to_string(),
            },
            None if index + 1 == self.stages.len() => RunStatus::Succeeded,
            None => RunStatus::Running { stage: index + 1 },
        };
        self.results.push(result);

        Ok(&self.status)
    }

    /// Result of the stage that failed the run
    pub fn failed_result(&self) -> Option<&ExecutionResult> {
        match self.status {
            RunStatus::Failed { stage, .. } => self.results.get(stage),
            _ => None,
        }
    }

    /// Finds the result recorded for a stage name
    pub fn result_for(&self, stage: &str) -> Option<&ExecutionResult> {
        self.results.iter().find(|result| result.stage() == stage)
    }

    /// Stages that never ran because an earlier stage failed
    pub fn skipped_stages(&self) -> Vec<&str> {
        match self.status {
            RunStatus::Failed { stage, .. } => self.stages[stage + 1..]
                .iter()
                .map(StageSpec::name)
                .collect(),
            _ => Vec::new(),
        }
    }
}
