//! Wiring of the service graph from resolved configuration.

use std::sync::Arc;

use crate::agent::{builtin_registry, LlmDecomposer, LlmProvider, VisionAnalyzer};
use crate::config::AppConfig;
use crate::desktop::Desktop;
use crate::progress::ProgressBroadcaster;
use crate::server::{ServerConfig, ServerState};
use crate::tasks::{EmailDrafter, SpreadsheetMaterializer, StepRouter};
use crate::workflow::WorkflowEngine;

impl From<&AppConfig> for ServerConfig {
    fn from(config: &AppConfig) -> Self {
        ServerConfig {
            requests_logging_level: config.logging_level.clone(),
            host: config.host.clone(),
            port: config.port,
        }
    }
}

/// Build the server state.
///
/// `text_llm` drives request decomposition and `vision_llm` screenshot
/// analysis; they usually point at the same server with different models.
pub fn build_state(
    config: &AppConfig,
    desktop: Arc<dyn Desktop>,
    text_llm: Arc<dyn LlmProvider>,
    vision_llm: Arc<dyn LlmProvider>,
) -> ServerState {
    let options = config.ollama.completion_options();

    let spreadsheet = Arc::new(SpreadsheetMaterializer::new(desktop.clone()));
    let email = Arc::new(EmailDrafter::new(desktop, config.ui_pacing));
    let vision = Arc::new(VisionAnalyzer::new(vision_llm, options.clone()));

    let engine = Arc::new(WorkflowEngine::new(
        Arc::new(StepRouter::new(spreadsheet.clone())),
        Arc::new(ProgressBroadcaster::new()),
        config.engine,
    ));
    let decomposer = Arc::new(LlmDecomposer::new(text_llm, options));
    let tools = Arc::new(builtin_registry(spreadsheet, email, vision));

    ServerState::new(config.into(), engine, decomposer, tools)
}
