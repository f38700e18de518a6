use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wire tag for browser steps.
pub const BROWSER_TYPE: &str = "browser";
/// Wire tag for spreadsheet steps.
pub const SPREADSHEET_TYPE: &str = "excel";

/// Kind of a step, used for routing and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Browser,
    Spreadsheet,
    Unsupported,
}

/// One atomic unit of work in a workflow.
///
/// The kind is fixed at construction. Spreadsheet rows are not required to
/// match the header width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Step {
    Browser {
        instruction: Option<String>,
    },
    Spreadsheet {
        instruction: Option<String>,
        headers: Vec<String>,
        data: Vec<Vec<Value>>,
    },
    /// Anything that is not a recognized step shape. The original tag and
    /// instruction are kept for diagnostics only.
    Unsupported {
        type_tag: Option<String>,
        instruction: Option<String>,
    },
}

impl Step {
    pub fn browser(instruction: impl Into<String>) -> Self {
        Step::Browser {
            instruction: Some(instruction.into()),
        }
    }

    pub fn spreadsheet(headers: Vec<String>, data: Vec<Vec<Value>>) -> Self {
        Step::Spreadsheet {
            instruction: None,
            headers,
            data,
        }
    }

    pub fn kind(&self) -> StepKind {
        match self {
            Step::Browser { .. } => StepKind::Browser,
            Step::Spreadsheet { .. } => StepKind::Spreadsheet,
            Step::Unsupported { .. } => StepKind::Unsupported,
        }
    }

    /// The free-text instruction attached to the step, if any.
    pub fn instruction(&self) -> Option<&str> {
        match self {
            Step::Browser { instruction }
            | Step::Spreadsheet { instruction, .. }
            | Step::Unsupported { instruction, .. } => instruction.as_deref(),
        }
    }

    /// Convert an arbitrary JSON value into a step.
    ///
    /// Never fails: missing `headers`/`data` become empty, a non-string
    /// instruction counts as absent, and anything else turns into
    /// [`Step::Unsupported`].
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Step::Unsupported {
                type_tag: None,
                instruction: None,
            };
        };

        let type_tag = obj.get("type").and_then(Value::as_str);
        let instruction = obj
            .get("instruction")
            .and_then(Value::as_str)
            .map(str::to_string);

        match type_tag {
            Some(BROWSER_TYPE) => Step::Browser { instruction },
            Some(SPREADSHEET_TYPE) => Step::Spreadsheet {
                instruction,
                headers: parse_headers(obj.get("headers")),
                data: parse_rows(obj.get("data")),
            },
            other => Step::Unsupported {
                type_tag: other.map(str::to_string),
                instruction,
            },
        }
    }
}

/// Read a header list; anything but an array yields no headers.
pub fn parse_headers(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(cell_text).collect(),
        _ => Vec::new(),
    }
}

/// Read spreadsheet rows; a scalar row becomes a one-cell row.
pub fn parse_rows(value: Option<&Value>) -> Vec<Vec<Value>> {
    match value {
        Some(Value::Array(rows)) => rows
            .iter()
            .map(|row| match row {
                Value::Array(cells) => cells.clone(),
                scalar => vec![scalar.clone()],
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Render a cell as text. Strings are written as-is, null as empty.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl From<Value> for Step {
    fn from(value: Value) -> Self {
        Step::from_value(&value)
    }
}

impl From<Step> for Value {
    fn from(step: Step) -> Self {
        let mut obj = Map::new();
        match step {
            Step::Browser { instruction } => {
                obj.insert("type".into(), BROWSER_TYPE.into());
                if let Some(instruction) = instruction {
                    obj.insert("instruction".into(), instruction.into());
                }
            }
            Step::Spreadsheet {
                instruction,
                headers,
                data,
            } => {
                obj.insert("type".into(), SPREADSHEET_TYPE.into());
                if let Some(instruction) = instruction {
                    obj.insert("instruction".into(), instruction.into());
                }
                obj.insert("headers".into(), headers.into());
                obj.insert(
                    "data".into(),
                    Value::Array(data.into_iter().map(Value::Array).collect()),
                );
            }
            Step::Unsupported {
                type_tag,
                instruction,
            } => {
                if let Some(tag) = type_tag {
                    obj.insert("type".into(), tag.into());
                }
                if let Some(instruction) = instruction {
                    obj.insert("instruction".into(), instruction.into());
                }
            }
        }
        Value::Object(obj)
    }
}
