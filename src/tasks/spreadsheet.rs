//! Spreadsheet materializer.
//!
//! Writes headers and rows to a CSV file in the temp directory and asks the
//! desktop to open it. Cells are joined with a comma without any escaping,
//! so a cell containing a comma shifts the rest of its row.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::info;

use super::HandlerError;
use crate::desktop::Desktop;
use crate::steps::cell_text;

const DELIMITER: &str = ",";

fn placeholder_headers() -> Vec<String> {
    vec!["Item".to_string(), "Value".to_string()]
}

fn placeholder_rows() -> Vec<Vec<Value>> {
    vec![
        vec![json!("Item 1"), json!(100)],
        vec![json!("Item 2"), json!(200)],
    ]
}

/// Render the CSV text. Falls back to placeholder content when both headers
/// and data are empty.
pub fn render_csv(headers: &[String], data: &[Vec<Value>]) -> (String, usize) {
    let (headers, data) = if headers.is_empty() && data.is_empty() {
        (placeholder_headers(), placeholder_rows())
    } else {
        (headers.to_vec(), data.to_vec())
    };

    let mut out = headers.join(DELIMITER);
    out.push('\n');
    for row in &data {
        let line = row.iter().map(cell_text).collect::<Vec<_>>().join(DELIMITER);
        out.push_str(&line);
        out.push('\n');
    }
    (out, data.len())
}

pub struct SpreadsheetMaterializer {
    desktop: Arc<dyn Desktop>,
    output_dir: PathBuf,
}

impl SpreadsheetMaterializer {
    pub fn new(desktop: Arc<dyn Desktop>) -> Self {
        Self::with_output_dir(desktop, std::env::temp_dir())
    }

    pub fn with_output_dir(desktop: Arc<dyn Desktop>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            desktop,
            output_dir: output_dir.into(),
        }
    }

    /// Write the artifact, open it and return a summary of what was written.
    ///
    /// The file is left in place after the call.
    pub async fn materialize(
        &self,
        headers: &[String],
        data: &[Vec<Value>],
    ) -> Result<String, HandlerError> {
        info!("Handling spreadsheet task");

        let (csv, rows) = render_csv(headers, data);
        let dir = self.output_dir.clone();
        let path = tokio::task::spawn_blocking(move || write_artifact(&dir, &csv))
            .await
            .map_err(|e| HandlerError::Io(e.to_string()))??;

        self.desktop.open_path(&path).await?;

        info!("Created and opened spreadsheet: {:?}", path);
        Ok(format!("Spreadsheet created with {} rows of data", rows))
    }
}

fn write_artifact(dir: &Path, contents: &str) -> Result<PathBuf, HandlerError> {
    let mut file = tempfile::Builder::new()
        .prefix("intervene-")
        .suffix(".csv")
        .tempfile_in(dir)
        .map_err(|e| HandlerError::Io(e.to_string()))?;
    file.write_all(contents.as_bytes())
        .map_err(|e| HandlerError::Io(e.to_string()))?;
    let (_, path) = file.keep().map_err(|e| HandlerError::Io(e.to_string()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::testing::{DesktopCall, FakeDesktop};
    use tempfile::TempDir;

    #[test]
    fn empty_input_uses_placeholders() {
        let (csv, rows) = render_csv(&[], &[]);
        assert_eq!(csv, "Item,Value\nItem 1,100\nItem 2,200\n");
        assert_eq!(rows, 2);
    }

    #[test]
    fn headers_without_rows_are_kept() {
        let (csv, rows) = render_csv(&["A".to_string(), "B".to_string()], &[]);
        assert_eq!(csv, "A,B\n");
        assert_eq!(rows, 0);
    }

    #[test]
    fn ragged_rows_are_written_positionally() {
        let headers = vec!["A".to_string(), "B".to_string()];
        let data = vec![vec![json!("1")], vec![json!("x"), json!(2), json!(true)]];
        let (csv, _) = render_csv(&headers, &data);
        assert_eq!(csv, "A,B\n1\nx,2,true\n");
    }

    #[tokio::test]
    async fn materialize_writes_and_opens_file() {
        let dir = TempDir::new().unwrap();
        let desktop = Arc::new(FakeDesktop::default());
        let materializer = SpreadsheetMaterializer::with_output_dir(desktop.clone(), dir.path());

        let result = materializer
            .materialize(&["A".to_string()], &[vec![json!("1")]])
            .await
            .unwrap();
        assert_eq!(result, "Spreadsheet created with 1 rows of data");

        let calls = desktop.calls();
        assert_eq!(calls.len(), 1);
        let DesktopCall::OpenPath(path) = &calls[0] else {
            panic!("expected open_path, got {:?}", calls[0]);
        };
        assert!(path.starts_with(dir.path()));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "A\n1\n");
    }

    #[tokio::test]
    async fn open_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let desktop = Arc::new(FakeDesktop::failing_open());
        let materializer = SpreadsheetMaterializer::with_output_dir(desktop, dir.path());

        let result = materializer.materialize(&[], &[]).await;
        assert!(matches!(result, Err(HandlerError::Desktop(_))));
    }
}
