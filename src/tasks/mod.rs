//! Step handlers and the router that dispatches to them.

pub mod browser;
pub mod email;
mod router;
pub mod spreadsheet;

pub use browser::{interpret, BrowserIntent};
pub use email::{EmailDrafter, UiPacing};
pub use router::{unsupported_message, StepHandler, StepRouter};
pub use spreadsheet::SpreadsheetMaterializer;

use crate::desktop::DesktopError;
use thiserror::Error;

/// Failure of a step handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Desktop action failed: {0}")]
    Desktop(#[from] DesktopError),

    #[error("I/O error: {0}")]
    Io(String),
}
