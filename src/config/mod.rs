mod file_config;

pub use file_config::{DesktopConfig, FileConfig, OllamaConfig};

use crate::agent::CompletionOptions;
use crate::server::RequestsLoggingLevel;
use crate::tasks::UiPacing;
use crate::workflow::EngineSettings;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8001;
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_LLM_MODEL: &str = "llama3.2";
pub const DEFAULT_VISION_MODEL: &str = "llava:3";
pub const DEFAULT_STEP_DELAY_MS: u64 = 1000;
pub const DEFAULT_STEP_GAP_MS: u64 = 500;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub host: String,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub ollama_base_url: String,
    pub llm_model: String,
    pub vision_model: String,
    pub step_delay_ms: u64,
    pub step_gap_ms: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            logging_level: RequestsLoggingLevel::default(),
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            step_delay_ms: DEFAULT_STEP_DELAY_MS,
            step_gap_ms: DEFAULT_STEP_GAP_MS,
        }
    }
}

/// Connection settings for the local model server.
#[derive(Debug, Clone, PartialEq)]
pub struct OllamaSettings {
    pub base_url: String,
    pub llm_model: String,
    pub vision_model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl OllamaSettings {
    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: self.temperature,
            max_tokens: None,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub engine: EngineSettings,
    pub ui_pacing: UiPacing,
    pub ollama: OllamaSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let host = file.host.unwrap_or_else(|| cli.host.clone());
        if host.trim().is_empty() {
            bail!("host must not be empty");
        }
        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let engine = EngineSettings {
            step_delay: Duration::from_millis(file.step_delay_ms.unwrap_or(cli.step_delay_ms)),
            step_gap: Duration::from_millis(file.step_gap_ms.unwrap_or(cli.step_gap_ms)),
        };

        let desktop_file = file.desktop.unwrap_or_default();
        let pacing_defaults = UiPacing::default();
        let ui_pacing = UiPacing {
            app_launch: desktop_file
                .app_launch_wait_ms
                .map(Duration::from_millis)
                .unwrap_or(pacing_defaults.app_launch),
            keystroke: desktop_file
                .keystroke_wait_ms
                .map(Duration::from_millis)
                .unwrap_or(pacing_defaults.keystroke),
        };

        let ollama_file = file.ollama.unwrap_or_default();
        let completion_defaults = CompletionOptions::default();
        let ollama = OllamaSettings {
            base_url: ollama_file
                .base_url
                .unwrap_or_else(|| cli.ollama_base_url.clone()),
            llm_model: ollama_file
                .llm_model
                .unwrap_or_else(|| cli.llm_model.clone()),
            vision_model: ollama_file
                .vision_model
                .unwrap_or_else(|| cli.vision_model.clone()),
            temperature: ollama_file
                .temperature
                .unwrap_or(completion_defaults.temperature),
            timeout_secs: ollama_file
                .timeout_secs
                .unwrap_or(completion_defaults.timeout.as_secs()),
        };

        if !ollama.base_url.starts_with("http://") && !ollama.base_url.starts_with("https://") {
            bail!(
                "Ollama base URL must start with http:// or https://, got {:?}",
                ollama.base_url
            );
        }
        if !(0.0..=2.0).contains(&ollama.temperature) {
            bail!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                ollama.temperature
            );
        }

        Ok(Self {
            host,
            port,
            logging_level,
            engine,
            ui_pacing,
            ollama,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
