use serde::Serialize;

use crate::steps::Step;

/// Position of the engine. Reset at the start of every accepted run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionState {
    pub is_running: bool,
    pub steps: Vec<Step>,
    /// Index of the step being executed; `None` before the first step of a run.
    pub current_step: Option<usize>,
}

impl ExecutionState {
    pub(super) fn begin(&mut self, steps: Vec<Step>) {
        self.is_running = true;
        self.steps = steps;
        self.current_step = None;
    }

    pub(super) fn advance(&mut self, index: usize) {
        debug_assert!(self.current_step.map_or(true, |current| index > current));
        self.current_step = Some(index);
    }

    pub(super) fn finish(&mut self) {
        self.is_running = false;
    }

    /// The step to report to an observer connecting now, if a run is active.
    pub fn active_step(&self) -> Option<usize> {
        if self.is_running {
            self.current_step
        } else {
            None
        }
    }
}
