//! Sift Runner
//!
//! Runs pipeline stages as external worker processes.
//!
//! Architecture:
//! - Execution: one child process per stage, output drained while it runs,
//!   killed when its timeout elapses
//! - Pipeline: stages run strictly one after another and the first failure
//!   ends the run
//!
//! Callers only ever see typed [`ExecutionResult`]s and [`PipelineRun`]s.
//!
//! [`ExecutionResult`]: sift_core::domain::execution::ExecutionResult
//! [`PipelineRun`]: sift_core::domain::run::PipelineRun

pub mod service;

pub use service::{PipelineOrchestrator, ProcessStageExecutor, StageExecutor};
