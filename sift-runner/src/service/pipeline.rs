//! Pipeline orchestration
//!
//! Runs the stages of one [`PipelineRun`] strictly in order. Each stage is
//! awaited until its worker has exited and its output is drained before the
//! next one starts. The first failing stage ends the run; nothing is retried.

use sift_core::domain::run::{PipelineRun, RunStatus};
use sift_core::domain::stage::StageSpec;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::service::execution::StageExecutor;

/// Sequences stages through a [`StageExecutor`]
///
/// Holds no per-run state, so one orchestrator serves any number of
/// concurrent runs.
#[derive(Clone)]
pub struct PipelineOrchestrator {
    executor: Arc<dyn StageExecutor>,
}

impl PipelineOrchestrator {
    pub fn new(executor: Arc<dyn StageExecutor>) -> Self {
        Self { executor }
    }

    /// Executes `stages` and returns the finished run
    pub async fn run(&self, stages: Vec<StageSpec>) -> PipelineRun {
        let mut run = PipelineRun::new(stages);
        let total = run.stages().len();

        if let Err(e) = run.start() {
            error!("Pipeline run {} could not start: {}", run.id(), e);
            return run;
        }

        info!("Pipeline run {} started with {} stage(s)", run.id(), total);

        while let Some((index, spec)) = run.current_stage() {
            info!(
                "Run {}: executing stage {}/{}: {}",
                run.id(),
                index + 1,
                total,
                spec.name()
            );

            let result = self.executor.execute(spec).await;

            if let Err(e) = run.record(result) {
                error!("Run {}: failed to record stage result: {}", run.id(), e);
                break;
            }
        }

        match run.status() {
            RunStatus::Succeeded => info!("Pipeline run {} succeeded", run.id()),
            RunStatus::Failed { stage, .. } => {
                let skipped = run.skipped_stages();
                let kind = run
                    .failed_result()
                    .and_then(|result| result.failure_kind())
                    .map_or("unknown", |kind| kind.as_str());
                warn!(
                    "Pipeline run {} failed at stage {} ('{}', {}), skipped: {:?}",
                    run.id(),
                    stage + 1,
                    run.stages()[*stage].name(),
                    kind,
                    skipped
                );
            }
            status => error!(
                "Pipeline run {} stopped in non-terminal state {:?}",
                run.id(),
                status
            ),
        }

        run
    }
}
