//! In-process stand-ins for the desktop and the LLM server

#![allow(dead_code)]

use async_trait::async_trait;
use intervene_server::agent::llm::{CompletionResponse, FinishReason};
use intervene_server::agent::{CompletionOptions, LlmError, LlmProvider, Message, MessageRole};
use intervene_server::desktop::{Desktop, DesktopApp, DesktopError, KeyCombo};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Desktop that records what it was asked to do and never touches the OS.
#[derive(Default)]
pub struct RecordingDesktop {
    opened: Mutex<Vec<PathBuf>>,
    launched: Mutex<Vec<DesktopApp>>,
    pasted: Mutex<Vec<String>>,
}

impl RecordingDesktop {
    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened.lock().unwrap().clone()
    }

    pub fn launched(&self) -> Vec<DesktopApp> {
        self.launched.lock().unwrap().clone()
    }

    pub fn pasted(&self) -> Vec<String> {
        self.pasted.lock().unwrap().clone()
    }
}

#[async_trait]
impl Desktop for RecordingDesktop {
    async fn open_path(&self, path: &Path) -> Result<(), DesktopError> {
        self.opened.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    async fn launch_app(&self, app: DesktopApp) -> Result<(), DesktopError> {
        self.launched.lock().unwrap().push(app);
        Ok(())
    }

    async fn press_keys(&self, _combo: &KeyCombo) -> Result<(), DesktopError> {
        Ok(())
    }

    async fn paste_text(&self, text: &str) -> Result<(), DesktopError> {
        self.pasted.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn capture_screen(&self, path: &Path) -> Result<(), DesktopError> {
        std::fs::write(path, b"png").map_err(|e| DesktopError::CommandFailed {
            command: "capture".to_string(),
            message: e.to_string(),
        })
    }
}

/// LLM that always gives the same reply, or always fails.
pub struct ScriptedLlm {
    reply: Result<String, String>,
}

impl ScriptedLlm {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reply: Err("connection refused".to_string()),
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        _messages: &[Message],
        _options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        match &self.reply {
            Ok(text) => Ok(CompletionResponse {
                message: Message {
                    role: MessageRole::Assistant,
                    content: text.clone(),
                    images: Vec::new(),
                },
                finish_reason: FinishReason::Stop,
            }),
            Err(e) => Err(LlmError::Connection(e.clone())),
        }
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        Ok(())
    }
}
