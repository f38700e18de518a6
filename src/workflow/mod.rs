//! The workflow engine: one run at a time, steps executed in order, progress
//! reported before and after every step.

mod engine;
mod state;

pub use engine::{EngineSettings, SubmitOutcome, WorkflowEngine};
pub use state::ExecutionState;
