//! Language-model backed pieces: the request decomposer, the screenshot
//! analyzer, the directly invokable tools and the one-shot copilot.

pub mod copilot;
pub mod decomposer;
pub mod llm;
pub mod tools;
pub mod vision;

pub use copilot::{Copilot, CopilotOutcome};
pub use decomposer::{
    fallback_steps, parse_steps, steps_or_fallback, DecodeError, LlmDecomposer, TaskDecomposer,
};
pub use llm::{CompletionOptions, LlmError, LlmProvider, Message, MessageRole, OllamaProvider};
pub use tools::{builtin_registry, AgentTool, AgentToolRegistry, ToolDefinition, ToolError};
pub use vision::VisionAnalyzer;
