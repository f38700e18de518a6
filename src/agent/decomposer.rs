//! Turns a free-text request into a list of steps using the language model.
//!
//! Model output is untrusted. [`parse_steps`] is the validation boundary and
//! [`steps_or_fallback`] is the policy applied when validation fails.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::llm::{CompletionOptions, LlmError, LlmProvider, Message};
use crate::steps::Step;

pub const FALLBACK_INSTRUCTION: &str = "open https://www.google.com";

const SYSTEM_PROMPT: &str = r#"You are an automation orchestrator. Break the user's request into a list of atomic steps. Each step is executed either by a browser automation agent or by a spreadsheet agent.

Rules:
- A browser step is one fully specified action. Always include the exact URL and, when searching, the full quoted query, e.g. open https://www.google.com and search for "LangChain".
- A spreadsheet step always carries "headers" (a list of column names) and "data" (a list of rows, each a list of cell values). When data comes from browser results, give the headers and example rows explicitly.
- Never ask for clarification or user input.
- Output only a JSON array, with double quotes, no trailing commas, no comments and no explanations.

Example:
[
  {"type": "browser", "instruction": "open https://www.google.com and search for \"LangChain\""},
  {"type": "excel", "instruction": "create a spreadsheet about LangChain", "headers": ["Title", "Description", "URL"], "data": [["LangChain", "Framework for LLM applications", "https://www.langchain.com"]]}
]"#;

/// Why a model reply could not be turned into steps.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("LLM request failed: {0}")]
    Llm(#[from] LlmError),

    #[error("No JSON array found in model output")]
    NoArray,

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Model returned no steps")]
    Empty,

    #[error("Step {index} is not an object")]
    NotAnObject { index: usize },
}

/// Produces steps for a free-text request.
#[async_trait]
pub trait TaskDecomposer: Send + Sync {
    async fn decompose(&self, request: &str) -> Result<Vec<Step>, DecodeError>;
}

pub struct LlmDecomposer {
    llm: Arc<dyn LlmProvider>,
    options: CompletionOptions,
}

impl LlmDecomposer {
    pub fn new(llm: Arc<dyn LlmProvider>, options: CompletionOptions) -> Self {
        Self { llm, options }
    }
}

#[async_trait]
impl TaskDecomposer for LlmDecomposer {
    async fn decompose(&self, request: &str) -> Result<Vec<Step>, DecodeError> {
        info!("Analyzing request: {}", request);
        let messages = [
            Message::system(SYSTEM_PROMPT),
            Message::user(format!("User request: {}", request)),
        ];
        let response = self.llm.complete(&messages, &self.options).await?;
        debug!(output = %response.message.content, "Decomposer output");

        let steps = parse_steps(&response.message.content)?;
        info!("Parsed {} steps from model output", steps.len());
        Ok(steps)
    }
}

/// Locate the outermost JSON array in `output` and convert its elements.
///
/// Every element must be an object; unknown step types are kept and later
/// reported as unsupported by the router.
pub fn parse_steps(output: &str) -> Result<Vec<Step>, DecodeError> {
    let start = output.find('[').ok_or(DecodeError::NoArray)?;
    let end = output.rfind(']').ok_or(DecodeError::NoArray)?;
    if end < start {
        return Err(DecodeError::NoArray);
    }

    let value: Value = serde_json::from_str(&output[start..=end])
        .map_err(|e| DecodeError::InvalidJson(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(DecodeError::NoArray);
    };
    if items.is_empty() {
        return Err(DecodeError::Empty);
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            if item.is_object() {
                Ok(Step::from_value(item))
            } else {
                Err(DecodeError::NotAnObject { index })
            }
        })
        .collect()
}

/// The single safe step used when decomposition fails.
pub fn fallback_steps() -> Vec<Step> {
    vec![Step::browser(FALLBACK_INSTRUCTION)]
}

pub fn steps_or_fallback(result: Result<Vec<Step>, DecodeError>) -> Vec<Step> {
    match result {
        Ok(steps) => steps,
        Err(e) => {
            warn!("Decomposition failed, using fallback step: {}", e);
            fallback_steps()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::llm::testing::ScriptedLlm;
    use crate::steps::StepKind;

    #[test]
    fn parses_array_surrounded_by_prose() {
        let output = r#"Sure! Here are the steps:
[{"type": "browser", "instruction": "open https://ex.com"},
 {"type": "excel", "headers": ["A"], "data": [["1"]]}]
Let me know if you need more."#;

        let steps = parse_steps(output).unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].kind(), StepKind::Browser);
        assert_eq!(steps[1].kind(), StepKind::Spreadsheet);
    }

    #[test]
    fn keeps_unknown_step_types() {
        let steps = parse_steps(r#"[{"type": "fax", "instruction": "send it"}]"#).unwrap();
        assert_eq!(steps[0].kind(), StepKind::Unsupported);
        assert_eq!(steps[0].instruction(), Some("send it"));
    }

    #[test]
    fn rejects_malformed_output() {
        assert!(matches!(parse_steps("no steps here"), Err(DecodeError::NoArray)));
        assert!(matches!(parse_steps("] before ["), Err(DecodeError::NoArray)));
        assert!(matches!(
            parse_steps(r#"[{'type': 'browser'}]"#),
            Err(DecodeError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_steps(r#"[{"type": "browser",}]"#),
            Err(DecodeError::InvalidJson(_))
        ));
        assert!(matches!(parse_steps("[]"), Err(DecodeError::Empty)));
        assert!(matches!(
            parse_steps(r#"[{"type": "browser"}, "oops"]"#),
            Err(DecodeError::NotAnObject { index: 1 })
        ));
    }

    #[test]
    fn fallback_is_a_single_browser_step() {
        let steps = steps_or_fallback(Err(DecodeError::Empty));
        assert_eq!(steps, vec![Step::browser("open https://www.google.com")]);
    }

    #[test]
    fn successful_result_passes_through() {
        let steps = vec![Step::browser("open https://ex.com")];
        assert_eq!(steps_or_fallback(Ok(steps.clone())), steps);
    }

    #[tokio::test]
    async fn decomposer_sends_request_to_model() {
        let llm = Arc::new(ScriptedLlm::replying(
            r#"[{"type": "browser", "instruction": "open https://ex.com"}]"#,
        ));
        let decomposer = LlmDecomposer::new(llm.clone(), CompletionOptions::default());

        let steps = decomposer.decompose("visit ex.com").await.unwrap();
        assert_eq!(steps, vec![Step::browser("open https://ex.com")]);

        let requests = llm.requests.lock().unwrap();
        let last = requests[0].last().unwrap();
        assert_eq!(last.content, "User request: visit ex.com");
    }

    #[tokio::test]
    async fn decomposer_surfaces_model_errors() {
        let llm = Arc::new(ScriptedLlm::failing(LlmError::Timeout));
        let decomposer = LlmDecomposer::new(llm, CompletionOptions::default());

        let result = decomposer.decompose("anything").await;
        assert!(matches!(result, Err(DecodeError::Llm(LlmError::Timeout))));
    }
}
