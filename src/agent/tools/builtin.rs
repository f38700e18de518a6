use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::registry::{AgentTool, ToolDefinition, ToolError};
use crate::agent::vision::VisionAnalyzer;
use crate::steps::{parse_headers, parse_rows, BROWSER_TYPE, SPREADSHEET_TYPE};
use crate::tasks::{self, EmailDrafter, SpreadsheetMaterializer};

fn str_arg<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

/// Classifies a browser instruction.
pub struct BrowserTool;

#[async_trait]
impl AgentTool for BrowserTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            BROWSER_TYPE,
            "Interpret a browser instruction (navigate and/or search)",
            json!({
                "type": "object",
                "properties": {
                    "instruction": {"type": "string"}
                },
                "required": ["instruction"]
            }),
        )
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        Ok(tasks::interpret(str_arg(&args, "instruction").unwrap_or("")))
    }
}

/// Writes and opens a spreadsheet.
pub struct SpreadsheetTool {
    materializer: Arc<SpreadsheetMaterializer>,
}

impl SpreadsheetTool {
    pub fn new(materializer: Arc<SpreadsheetMaterializer>) -> Self {
        Self { materializer }
    }
}

#[async_trait]
impl AgentTool for SpreadsheetTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            SPREADSHEET_TYPE,
            "Create a spreadsheet from headers and rows and open it",
            json!({
                "type": "object",
                "properties": {
                    "headers": {"type": "array", "items": {"type": "string"}},
                    "data": {"type": "array", "items": {"type": "array"}}
                },
                "required": []
            }),
        )
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        let headers = parse_headers(args.get("headers"));
        let data = parse_rows(args.get("data"));
        Ok(self.materializer.materialize(&headers, &data).await?)
    }
}

/// Drafts an email in the mail client.
pub struct EmailTool {
    drafter: Arc<EmailDrafter>,
}

impl EmailTool {
    pub fn new(drafter: Arc<EmailDrafter>) -> Self {
        Self { drafter }
    }
}

#[async_trait]
impl AgentTool for EmailTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "email",
            "Open a new email draft and paste the given text",
            json!({
                "type": "object",
                "properties": {
                    "draft_text": {"type": "string"}
                },
                "required": []
            }),
        )
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        Ok(self.drafter.draft(str_arg(&args, "draft_text")).await?)
    }
}

/// Describes a screenshot with the vision model.
pub struct VisionTool {
    analyzer: Arc<VisionAnalyzer>,
}

impl VisionTool {
    pub fn new(analyzer: Arc<VisionAnalyzer>) -> Self {
        Self { analyzer }
    }
}

#[async_trait]
impl AgentTool for VisionTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "vision_analyze",
            "Describe the application and possible tasks visible in a screenshot",
            json!({
                "type": "object",
                "properties": {
                    "screenshot_path": {"type": "string"}
                },
                "required": ["screenshot_path"]
            }),
        )
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        let path = str_arg(&args, "screenshot_path")
            .ok_or_else(|| ToolError::InvalidArguments("missing screenshot_path".to_string()))?;
        Ok(self.analyzer.describe(Path::new(path)).await)
    }
}
