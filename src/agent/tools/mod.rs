//! Directly invokable tools.
//!
//! Tools bypass the workflow engine: each call runs one handler and returns
//! its result to the caller.

mod builtin;
mod registry;

pub use builtin::{BrowserTool, EmailTool, SpreadsheetTool, VisionTool};
pub use registry::{AgentTool, AgentToolRegistry, ToolDefinition, ToolError};

use std::sync::Arc;

use super::vision::VisionAnalyzer;
use crate::tasks::{EmailDrafter, SpreadsheetMaterializer};

/// Registry with the `browser`, `excel`, `email` and `vision_analyze` tools.
pub fn builtin_registry(
    spreadsheet: Arc<SpreadsheetMaterializer>,
    email: Arc<EmailDrafter>,
    vision: Arc<VisionAnalyzer>,
) -> AgentToolRegistry {
    let mut registry = AgentToolRegistry::new();
    registry.register(BrowserTool);
    registry.register(SpreadsheetTool::new(spreadsheet));
    registry.register(EmailTool::new(email));
    registry.register(VisionTool::new(vision));
    registry
}
