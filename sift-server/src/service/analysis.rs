//! Analysis Service
//!
//! Boundary between HTTP requests and the pipeline orchestrator. Required
//! fields are checked before any worker is launched; a failed run is turned
//! into a [`StageFailure`] that keeps the failing stage's stderr verbatim.

use sift_core::domain::execution::{FailureKind, StageOutcome};
use sift_core::domain::run::{PipelineRun, RunStatus};
use sift_core::dto::analysis::{
    AnalyzeRequest, AnalyzeResponse, CollectAndAnalyzeRequest, CollectAndAnalyzeResponse,
    CollectRequest, CollectResponse,
};
use sift_runner::PipelineOrchestrator;
use thiserror::Error;

use crate::service::plan::{CollectLimits, StageKind, StagePlan, StagePlanner};

/// Service error type
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A required request field is missing or malformed
    #[error("{0}")]
    Validation(String),

    /// The collect stage of a collect-and-analyze request ran out of time
    #[error("{}", .0.message)]
    CollectTimedOut(Box<StageFailure>),

    /// Any other stage failure
    #[error("{}", .0.message)]
    StageFailed(Box<StageFailure>),

    /// The run stopped without reaching a terminal state
    #[error("pipeline run ended unexpectedly: {0}")]
    Internal(String),
}

/// Diagnostics of the stage that ended a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    pub stage: String,
    pub kind: FailureKind,
    /// Summary naming the stage and how it failed
    pub message: String,
    /// Captured stderr, or the launch error for a spawn failure
    pub details: String,
    /// Captured stdout of the failing stage
    pub output: String,
    /// `(stage, stdout)` of every stage that completed before the failure
    pub completed: Vec<(String, String)>,
    pub skipped: Vec<String>,
}

impl StageFailure {
    /// Builds the failure report of a run in the `Failed` state
    pub fn from_run(run: &PipelineRun) -> Option<Self> {
        let RunStatus::Failed { stage, reason } = run.status() else {
            return None;
        };
        let result = run.failed_result()?;

        let completed = run.results()[..*stage]
            .iter()
            .map(|r| (r.stage().to_string(), r.stdout().to_string()))
            .collect();

        let summary = match StageKind::from_name(result.stage()) {
            Some(kind) => kind.failure_message().to_string(),
            None => format!("Stage '{}' failed", result.stage()),
        };
        let how = match result.outcome() {
            StageOutcome::Exited { code } => format!("exited with code {}", code),
            StageOutcome::Terminated => "was killed by a signal".to_string(),
            StageOutcome::TimedOut => {
                let timeout = run.stages()[*stage].timeout();
                format!("timed out after {}s", timeout.as_secs_f64())
            }
            StageOutcome::SpawnFailed { .. } => "could not be launched".to_string(),
        };

        Some(Self {
            stage: result.stage().to_string(),
            kind: result.failure_kind().unwrap_or(FailureKind::WorkerFailure),
            message: format!("{} ({} stage {})", summary, result.stage(), how),
            details: reason.clone(),
            output: result.stdout().to_string(),
            completed,
            skipped: run
                .skipped_stages()
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
    }

    /// Stdout of a stage that completed before the failure
    pub fn completed_output(&self, stage: StageKind) -> Option<&str> {
        self.completed
            .iter()
            .find(|(name, _)| name == stage.name())
            .map(|(_, output)| output.as_str())
    }
}

/// Validates requests, runs the matching stage plan and maps the result
#[derive(Clone)]
pub struct PipelineRequestHandler {
    orchestrator: PipelineOrchestrator,
    planner: StagePlanner,
}

impl PipelineRequestHandler {
    pub fn new(orchestrator: PipelineOrchestrator, planner: StagePlanner) -> Self {
        Self {
            orchestrator,
            planner,
        }
    }

    /// Collect only
    pub async fn collect(&self, req: CollectRequest) -> Result<CollectResponse, AnalysisError> {
        let product_url = require_url(req.product_url)?;
        let limits = self.collect_limits(req.max_pages, req.max_reviews);

        let run = self
            .execute(StagePlan::CollectOnly {
                product_url,
                limits,
            })
            .await?;

        Ok(CollectResponse {
            success: true,
            message: "Reviews collected".to_string(),
            collect_output: stdout_of(&run, StageKind::Collect),
            index_output: None,
        })
    }

    /// Collect, then rebuild the index
    pub async fn collect_and_index(
        &self,
        req: CollectRequest,
    ) -> Result<CollectResponse, AnalysisError> {
        let product_url = require_url(req.product_url)?;
        let limits = self.collect_limits(req.max_pages, req.max_reviews);

        let run = self
            .execute(StagePlan::CollectAndIndex {
                product_url,
                limits,
            })
            .await?;

        Ok(CollectResponse {
            success: true,
            message: "Reviews collected and index updated".to_string(),
            collect_output: stdout_of(&run, StageKind::Collect),
            index_output: Some(stdout_of(&run, StageKind::Index)),
        })
    }

    /// Answer a question against the existing index
    pub async fn analyze(&self, req: AnalyzeRequest) -> Result<AnalyzeResponse, AnalysisError> {
        let question = require("question", req.question)?;

        let run = self.execute(StagePlan::QueryOnly { question }).await?;

        Ok(AnalyzeResponse {
            answer: stdout_of(&run, StageKind::Query).trim().to_string(),
        })
    }

    /// Collect, index, then answer
    pub async fn collect_and_analyze(
        &self,
        req: CollectAndAnalyzeRequest,
    ) -> Result<CollectAndAnalyzeResponse, AnalysisError> {
        let question = require("question", req.question)?;
        let product_url = require_url(req.product_url)?;
        let limits = self.planner.limits(
            self.planner.config().analyze_limits,
            req.max_pages,
            req.max_reviews,
        );

        let result = self
            .execute(StagePlan::Full {
                product_url,
                limits,
                question,
            })
            .await;

        let run = match result {
            Err(AnalysisError::StageFailed(failure))
                if failure.stage == StageKind::Collect.name()
                    && failure.kind == FailureKind::TimeoutExceeded =>
            {
                return Err(AnalysisError::CollectTimedOut(failure));
            }
            other => other?,
        };

        Ok(CollectAndAnalyzeResponse {
            answer: stdout_of(&run, StageKind::Query).trim().to_string(),
            collect_output: stdout_of(&run, StageKind::Collect),
            index_output: stdout_of(&run, StageKind::Index),
        })
    }

    fn collect_limits(&self, max_pages: Option<u32>, max_reviews: Option<u32>) -> CollectLimits {
        self.planner
            .limits(self.planner.config().collect_limits, max_pages, max_reviews)
    }

    /// Runs a plan; only a succeeded run is returned as `Ok`
    async fn execute(&self, plan: StagePlan) -> Result<PipelineRun, AnalysisError> {
        let stages = self.planner.build(&plan);
        let names: Vec<&str> = plan.stages().iter().map(StageKind::name).collect();
        tracing::info!("Running {} plan: {}", plan.name(), names.join(" -> "));

        let run = self.orchestrator.run(stages).await;

        match run.status() {
            RunStatus::Succeeded => Ok(run),
            RunStatus::Failed { .. } => {
                let failure = StageFailure::from_run(&run).ok_or_else(|| {
                    AnalysisError::Internal(format!("run {} has no failed result", run.id()))
                })?;
                tracing::warn!("{}: {}", failure.message, failure.details.trim_end());
                Err(AnalysisError::StageFailed(Box::new(failure)))
            }
            status => Err(AnalysisError::Internal(format!(
                "run {} stopped in state {:?}",
                run.id(),
                status
            ))),
        }
    }
}

// =============================================================================
// Validation
// =============================================================================

fn require(field: &str, value: Option<String>) -> Result<String, AnalysisError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(AnalysisError::Validation(format!("{} is required", field))),
    }
}

fn require_url(value: Option<String>) -> Result<String, AnalysisError> {
    let url = require("product_url", value)?;
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(AnalysisError::Validation(
            "product_url must start with http:// or https://".to_string(),
        ));
    }
    Ok(url)
}

fn stdout_of(run: &PipelineRun, stage: StageKind) -> String {
    run.result_for(stage.name())
        .map(|result| result.stdout().to_string())
        .unwrap_or_default()
}
