//! Workflow engine.
//!
//! Owns the execution state and drives one run at a time on a spawned task.
//! Admission is a check-and-set of `is_running` under the state lock; a
//! submission arriving during a run is refused, never queued.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::state::ExecutionState;
use crate::progress::{ProgressBroadcaster, ProgressEvent};
use crate::steps::Step;
use crate::tasks::{HandlerError, StepHandler};

/// Pacing of a run.
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    /// Pause between a step's handler returning and its completed event.
    pub step_delay: Duration,
    /// Pause after a completed event before the next step starts.
    pub step_gap: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            step_delay: Duration::from_millis(1000),
            step_gap: Duration::from_millis(500),
        }
    }
}

impl EngineSettings {
    pub fn immediate() -> Self {
        Self {
            step_delay: Duration::ZERO,
            step_gap: Duration::ZERO,
        }
    }
}

/// Acknowledgment of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitOutcome {
    #[serde(rename = "success")]
    pub accepted: bool,
    pub message: String,
}

impl SubmitOutcome {
    fn accepted() -> Self {
        Self {
            accepted: true,
            message: "Execution started".to_string(),
        }
    }

    fn rejected(message: &str) -> Self {
        Self {
            accepted: false,
            message: message.to_string(),
        }
    }
}

pub struct WorkflowEngine {
    state: Arc<Mutex<ExecutionState>>,
    router: Arc<dyn StepHandler>,
    broadcaster: Arc<ProgressBroadcaster>,
    settings: EngineSettings,
    shutdown: CancellationToken,
    run_task: Mutex<Option<JoinHandle<()>>>,
}

impl WorkflowEngine {
    pub fn new(
        router: Arc<dyn StepHandler>,
        broadcaster: Arc<ProgressBroadcaster>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(ExecutionState::default())),
            router,
            broadcaster,
            settings,
            shutdown: CancellationToken::new(),
            run_task: Mutex::new(None),
        }
    }

    /// Start a run over `steps` unless one is already in progress.
    ///
    /// Returns immediately; the run proceeds on a spawned task. Must be
    /// called from within a Tokio runtime.
    pub fn submit(&self, steps: Vec<Step>) -> SubmitOutcome {
        if self.shutdown.is_cancelled() {
            return SubmitOutcome::rejected("Server is shutting down");
        }

        {
            let mut state = self.state.lock().unwrap();
            if state.is_running {
                info!("Submission refused, execution already in progress");
                return SubmitOutcome::rejected("Execution already in progress");
            }
            state.begin(steps.clone());
        }

        info!("Starting workflow with {} steps", steps.len());
        let run = Run {
            state: self.state.clone(),
            router: self.router.clone(),
            broadcaster: self.broadcaster.clone(),
            settings: self.settings,
            cancel: self.shutdown.child_token(),
        };
        let handle = tokio::spawn(run.execute(steps));
        *self.run_task.lock().unwrap() = Some(handle);

        SubmitOutcome::accepted()
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().unwrap().is_running
    }

    pub fn snapshot(&self) -> ExecutionState {
        self.state.lock().unwrap().clone()
    }

    pub fn broadcaster(&self) -> &Arc<ProgressBroadcaster> {
        &self.broadcaster
    }

    /// Cancel the current run, if any, and wait for its task to end.
    ///
    /// Further submissions are refused.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let handle = self.run_task.lock().unwrap().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("Workflow task ended abnormally: {}", e);
            }
        }
        info!("Workflow engine stopped");
    }
}

/// Why a run ended before its last step.
enum Abort {
    Handler { index: usize, error: HandlerError },
    Cancelled,
}

/// Clears `is_running` however the run ends, including on panic.
struct RunningGuard(Arc<Mutex<ExecutionState>>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        match self.0.lock() {
            Ok(mut state) => state.finish(),
            Err(poisoned) => poisoned.into_inner().finish(),
        }
    }
}

struct Run {
    state: Arc<Mutex<ExecutionState>>,
    router: Arc<dyn StepHandler>,
    broadcaster: Arc<ProgressBroadcaster>,
    settings: EngineSettings,
    cancel: CancellationToken,
}

impl Run {
    async fn execute(self, steps: Vec<Step>) {
        let _guard = RunningGuard(self.state.clone());

        match self.execute_steps(&steps).await {
            Ok(()) => info!("Workflow completed ({} steps)", steps.len()),
            Err(Abort::Handler { index, error }) => {
                error!("Error executing workflow at step {}: {}", index + 1, error)
            }
            Err(Abort::Cancelled) => warn!("Workflow cancelled"),
        }
    }

    async fn execute_steps(&self, steps: &[Step]) -> Result<(), Abort> {
        for (index, step) in steps.iter().enumerate() {
            self.state.lock().unwrap().advance(index);
            debug!(index, kind = ?step.kind(), "Executing step");

            self.notify(ProgressEvent::started(index, step.instruction()))
                .await;

            let result = tokio::select! {
                result = self.router.route(step) => result,
                _ = self.cancel.cancelled() => return Err(Abort::Cancelled),
            };
            let text = match &result {
                Ok(text) => text.clone(),
                Err(e) => format!("Error: {}", e),
            };

            self.pause(self.settings.step_delay).await?;
            self.notify(ProgressEvent::completed(index, &text)).await;

            if let Err(error) = result {
                return Err(Abort::Handler { index, error });
            }

            self.pause(self.settings.step_gap).await?;
        }
        Ok(())
    }

    async fn notify(&self, event: ProgressEvent) {
        debug!("{}", event.message);
        self.broadcaster.broadcast(&event).await;
    }

    async fn pause(&self, duration: Duration) -> Result<(), Abort> {
        tokio::select! {
            _ = tokio::time::sleep(duration) => Ok(()),
            _ = self.cancel.cancelled() => Err(Abort::Cancelled),
        }
    }
}
