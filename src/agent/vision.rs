//! Screenshot description with the vision model.

use std::path::Path;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;
use tracing::{error, info};

use super::llm::{CompletionOptions, LlmError, LlmProvider, Message};

const VISION_PROMPT: &str = "Analyze this screenshot and tell me:
1. What application is visible?
2. What is the main content or context?
3. What tasks could be performed here?

Be concise and focus on actionable insights.";

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

pub struct VisionAnalyzer {
    llm: Arc<dyn LlmProvider>,
    options: CompletionOptions,
}

impl VisionAnalyzer {
    pub fn new(llm: Arc<dyn LlmProvider>, options: CompletionOptions) -> Self {
        Self { llm, options }
    }

    /// Describe the image at `path`. Failures are returned as text.
    pub async fn describe(&self, path: &Path) -> String {
        match self.analyze(path).await {
            Ok(text) => text,
            Err(e) => {
                error!("Error analyzing screenshot: {}", e);
                format!("Error analyzing screenshot: {}", e)
            }
        }
    }

    pub async fn analyze(&self, path: &Path) -> Result<String, VisionError> {
        let bytes = tokio::fs::read(path).await?;
        let image = STANDARD.encode(bytes);

        info!("Analyzing screenshot using {}", self.llm.model());
        let messages = [Message::user_with_image(VISION_PROMPT, image)];
        let response = self.llm.complete(&messages, &self.options).await?;

        info!("Screenshot analysis completed");
        Ok(response.message.content.trim().to_string())
    }
}
