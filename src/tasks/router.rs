//! Step router.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::browser;
use super::spreadsheet::SpreadsheetMaterializer;
use super::HandlerError;
use crate::steps::Step;

/// Executes one step and describes the outcome.
#[async_trait]
pub trait StepHandler: Send + Sync {
    async fn route(&self, step: &Step) -> Result<String, HandlerError>;
}

/// Routes steps by kind to the browser interpreter or the spreadsheet
/// materializer. Unknown kinds produce a message, never an error.
pub struct StepRouter {
    spreadsheet: Arc<SpreadsheetMaterializer>,
}

impl StepRouter {
    pub fn new(spreadsheet: Arc<SpreadsheetMaterializer>) -> Self {
        Self { spreadsheet }
    }
}

pub fn unsupported_message(instruction: Option<&str>) -> String {
    format!(
        "Unsupported query type for step: {}",
        instruction.unwrap_or("No instruction")
    )
}

#[async_trait]
impl StepHandler for StepRouter {
    async fn route(&self, step: &Step) -> Result<String, HandlerError> {
        debug!("Routing {:?} step", step.kind());
        match step {
            Step::Browser { instruction } => {
                Ok(browser::interpret(instruction.as_deref().unwrap_or_default()))
            }
            Step::Spreadsheet { headers, data, .. } => {
                self.spreadsheet.materialize(headers, data).await
            }
            Step::Unsupported { instruction, .. } => {
                Ok(unsupported_message(instruction.as_deref()))
            }
        }
    }
}
