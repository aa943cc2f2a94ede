//! Test doubles shared by service and API tests

use async_trait::async_trait;
use sift_core::domain::execution::{ExecutionResult, StageOutcome};
use sift_core::domain::stage::StageSpec;
use sift_runner::{PipelineOrchestrator, StageExecutor};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::service::analysis::PipelineRequestHandler;
use crate::service::plan::StagePlanner;

/// Executor that records every invocation and replays scripted outcomes
///
/// Stages without a scripted outcome exit 0 with empty output.
#[derive(Default)]
pub(crate) struct RecordingExecutor {
    outcomes: HashMap<String, (StageOutcome, String, String)>,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl RecordingExecutor {
    pub(crate) fn with_stdout(self, stage: &str, stdout: &str) -> Self {
        self.with_outcome(stage, StageOutcome::Exited { code: 0 }, stdout, "")
    }

    pub(crate) fn with_outcome(
        mut self,
        stage: &str,
        outcome: StageOutcome,
        stdout: &str,
        stderr: &str,
    ) -> Self {
        self.outcomes.insert(
            stage.to_string(),
            (outcome, stdout.to_string(), stderr.to_string()),
        );
        self
    }

    pub(crate) fn invocations(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(stage, _)| stage.clone())
            .collect()
    }

    pub(crate) fn args_for(&self, stage: &str) -> Option<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _)| name == stage)
            .map(|(_, args)| args.clone())
    }
}

#[async_trait]
impl StageExecutor for RecordingExecutor {
    async fn execute(&self, spec: &StageSpec) -> ExecutionResult {
        self.calls
            .lock()
            .unwrap()
            .push((spec.name().to_string(), spec.args().to_vec()));

        let (outcome, stdout, stderr) = self
            .outcomes
            .get(spec.name())
            .cloned()
            .unwrap_or((StageOutcome::Exited { code: 0 }, String::new(), String::new()));

        ExecutionResult::new(spec.name(), outcome, stdout, stderr)
    }
}

/// Request handler wired to `executor` with default configuration
pub(crate) fn handler_with(executor: Arc<RecordingExecutor>) -> PipelineRequestHandler {
    PipelineRequestHandler::new(
        PipelineOrchestrator::new(executor),
        StagePlanner::new(Config::default()),
    )
}
