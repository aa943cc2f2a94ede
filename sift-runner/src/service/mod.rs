//! Service layer
//!
//! The executor is trait-based so the orchestrator can be driven by
//! substitute executors in tests.

mod execution;
mod output;
mod pipeline;

// Re-export traits
pub use execution::StageExecutor;

// Re-export implementations
pub use execution::ProcessStageExecutor;
pub use output::OutputBuffer;
pub use pipeline::PipelineOrchestrator;
