use serde::{Deserialize, Serialize};

/// A progress notification as sent on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub completed_step_index: usize,
    pub message: String,
}

impl ProgressEvent {
    pub fn started(index: usize, instruction: Option<&str>) -> Self {
        Self {
            completed_step_index: index,
            message: format!(
                "Started step {}: {}",
                index + 1,
                instruction.unwrap_or("No instruction")
            ),
        }
    }

    pub fn completed(index: usize, result: &str) -> Self {
        Self {
            completed_step_index: index,
            message: format!("Completed step {}: {}", index + 1, result),
        }
    }

    /// Sent to an observer that connects while a run is in progress.
    pub fn current(index: usize) -> Self {
        Self {
            completed_step_index: index,
            message: format!("Currently at step {}", index + 1),
        }
    }
}
