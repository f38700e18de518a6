//! Operating-system automation primitives.
//!
//! Everything here is fire-and-forget: a primitive succeeding only means the
//! underlying command was accepted, not that the target application reacted.

mod keys;
mod system;

pub use keys::{KeyCombo, Modifier};
pub use system::SystemDesktop;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Applications the handlers know how to bring up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopApp {
    Mail,
    Spreadsheet,
}

#[derive(Debug, Error)]
pub enum DesktopError {
    #[error("Invalid key combination: {0}")]
    InvalidKeyCombo(String),

    #[error("Failed to run {command}: {message}")]
    CommandFailed { command: String, message: String },

    #[error("Clipboard error: {0}")]
    Clipboard(String),
}

/// OS-level actions used by step handlers and the copilot.
#[async_trait]
pub trait Desktop: Send + Sync {
    /// Open a file with its default application.
    async fn open_path(&self, path: &Path) -> Result<(), DesktopError>;

    /// Bring up an application.
    async fn launch_app(&self, app: DesktopApp) -> Result<(), DesktopError>;

    /// Send a keystroke to the focused application.
    async fn press_keys(&self, combo: &KeyCombo) -> Result<(), DesktopError>;

    /// Paste text at the cursor position.
    async fn paste_text(&self, text: &str) -> Result<(), DesktopError>;

    /// Save a screenshot of the whole screen to `path`.
    async fn capture_screen(&self, path: &Path) -> Result<(), DesktopError>;
}
