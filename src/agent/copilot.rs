//! Autonomous one-shot copilot.
//!
//! Stands by for a moment, then, unless a human touched the keyboard or
//! pointer meanwhile, looks at the screen and performs the task it suggests.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::vision::VisionAnalyzer;
use crate::desktop::Desktop;
use crate::override_watch::OverrideHandle;
use crate::tasks::{EmailDrafter, HandlerError, SpreadsheetMaterializer};

pub const NO_TASK_DETECTED: &str = "No specific task detected";

/// Task suggested by a screen description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestedTask {
    Email,
    Spreadsheet,
    Nothing,
}

impl SuggestedTask {
    /// Email wins over spreadsheet when both are mentioned.
    pub fn from_analysis(analysis: &str) -> Self {
        let lower = analysis.to_lowercase();
        if lower.contains("email") {
            SuggestedTask::Email
        } else if lower.contains("spreadsheet") || lower.contains("excel") {
            SuggestedTask::Spreadsheet
        } else {
            SuggestedTask::Nothing
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopilotOutcome {
    /// Human input was seen during standby; nothing was done.
    Cancelled,
    Completed { analysis: String, result: String },
}

pub struct Copilot {
    desktop: Arc<dyn Desktop>,
    vision: Arc<VisionAnalyzer>,
    email: Arc<EmailDrafter>,
    spreadsheet: Arc<SpreadsheetMaterializer>,
    standby: Duration,
    screenshot_dir: PathBuf,
}

impl Copilot {
    pub fn new(
        desktop: Arc<dyn Desktop>,
        vision: Arc<VisionAnalyzer>,
        email: Arc<EmailDrafter>,
        spreadsheet: Arc<SpreadsheetMaterializer>,
    ) -> Self {
        Self {
            desktop,
            vision,
            email,
            spreadsheet,
            standby: Duration::from_secs(2),
            screenshot_dir: std::env::temp_dir(),
        }
    }

    pub fn with_standby(mut self, standby: Duration) -> Self {
        self.standby = standby;
        self
    }

    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    pub async fn run(&self, watch: &OverrideHandle) -> Result<CopilotOutcome, HandlerError> {
        info!("Copilot standing by...");
        tokio::time::sleep(self.standby).await;

        if watch.overridden() {
            info!("Manual override detected. Task cancelled.");
            return Ok(CopilotOutcome::Cancelled);
        }

        info!("No user detected, proceeding with workflow...");
        self.run_task_workflow().await
    }

    async fn run_task_workflow(&self) -> Result<CopilotOutcome, HandlerError> {
        info!("Starting task workflow");

        // Deleted when dropped, including on early return.
        let screenshot = tempfile::Builder::new()
            .prefix("intervene-screen-")
            .suffix(".png")
            .tempfile_in(&self.screenshot_dir)
            .map_err(|e| HandlerError::Io(e.to_string()))?
            .into_temp_path();

        self.desktop.capture_screen(&screenshot).await?;

        let analysis = self.vision.describe(&screenshot).await;
        info!("Screen analysis: {}", analysis);

        let result = match SuggestedTask::from_analysis(&analysis) {
            SuggestedTask::Email => self.email.draft(None).await?,
            SuggestedTask::Spreadsheet => self.spreadsheet.materialize(&[], &[]).await?,
            SuggestedTask::Nothing => NO_TASK_DETECTED.to_string(),
        };

        screenshot
            .close()
            .map_err(|e| HandlerError::Io(e.to_string()))?;

        Ok(CopilotOutcome::Completed { analysis, result })
    }
}
