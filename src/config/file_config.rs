use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub host: Option<String>,
    pub port: Option<u16>,
    pub logging_level: Option<String>,
    pub step_delay_ms: Option<u64>,
    pub step_gap_ms: Option<u64>,

    // Feature configs
    pub ollama: Option<OllamaConfig>,
    pub desktop: Option<DesktopConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: Option<String>,
    pub llm_model: Option<String>,
    pub vision_model: Option<String>,
    pub temperature: Option<f32>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct DesktopConfig {
    /// Wait after launching an application, in milliseconds.
    pub app_launch_wait_ms: Option<u64>,
    /// Wait after a keystroke that opens a window, in milliseconds.
    pub keystroke_wait_ms: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
