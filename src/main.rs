use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use intervene_server::agent::{LlmProvider, OllamaProvider};
use intervene_server::app::build_state;
use intervene_server::config::{self, DEFAULT_HOST, DEFAULT_LLM_MODEL, DEFAULT_OLLAMA_BASE_URL};
use intervene_server::config::{DEFAULT_STEP_DELAY_MS, DEFAULT_STEP_GAP_MS, DEFAULT_VISION_MODEL};
use intervene_server::desktop::SystemDesktop;
use intervene_server::server::{run_server, RequestsLoggingLevel};

const SERVER_STOP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(version, about = "Desktop automation orchestrator")]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// The address to bind to.
    #[clap(long, env = "SERVER_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// The port to listen on.
    #[clap(short, long, env = "SERVER_PORT", default_value_t = config::DEFAULT_PORT)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Base URL of the Ollama server.
    #[clap(long, env = "OLLAMA_BASE_URL", default_value = DEFAULT_OLLAMA_BASE_URL)]
    pub ollama_base_url: String,

    /// Model used to break requests into steps.
    #[clap(long, env = "OLLAMA_LLM_MODEL", default_value = DEFAULT_LLM_MODEL)]
    pub llm_model: String,

    /// Model used to describe screenshots.
    #[clap(long, env = "OLLAMA_VISION_MODEL", default_value = DEFAULT_VISION_MODEL)]
    pub vision_model: String,

    /// Pause between a step finishing and its completion event, in milliseconds.
    #[clap(long, default_value_t = DEFAULT_STEP_DELAY_MS)]
    pub step_delay_ms: u64,

    /// Pause between steps, in milliseconds.
    #[clap(long, default_value_t = DEFAULT_STEP_GAP_MS)]
    pub step_gap_ms: u64,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            host: args.host.clone(),
            port: args.port,
            logging_level: args.logging_level.clone(),
            ollama_base_url: args.ollama_base_url.clone(),
            llm_model: args.llm_model.clone(),
            vision_model: args.vision_model.clone(),
            step_delay_ms: args.step_delay_ms,
            step_gap_ms: args.step_gap_ms,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is fine; real env vars still apply.
    dotenvy::dotenv().ok();
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  bind: {}", app_config.bind_address());
    info!("  logging_level: {}", app_config.logging_level);
    info!("  ollama_base_url: {}", app_config.ollama.base_url);
    info!("  llm_model: {}", app_config.ollama.llm_model);
    info!("  vision_model: {}", app_config.ollama.vision_model);
    info!("  llm_temperature: {}", app_config.ollama.temperature);
    info!("  llm_timeout_secs: {}", app_config.ollama.timeout_secs);
    info!("  step_delay: {:?}", app_config.engine.step_delay);
    info!("  step_gap: {:?}", app_config.engine.step_gap);
    info!("  app_launch_wait: {:?}", app_config.ui_pacing.app_launch);
    info!("  keystroke_wait: {:?}", app_config.ui_pacing.keystroke);

    let text_llm: Arc<dyn LlmProvider> = Arc::new(OllamaProvider::new(
        &app_config.ollama.base_url,
        &app_config.ollama.llm_model,
    ));
    let vision_llm: Arc<dyn LlmProvider> = Arc::new(OllamaProvider::new(
        &app_config.ollama.base_url,
        &app_config.ollama.vision_model,
    ));
    if let Err(e) = text_llm.health_check().await {
        warn!(
            "Ollama is not reachable at {}: {}. Requests will use the fallback step.",
            app_config.ollama.base_url, e
        );
    }

    let state = build_state(
        &app_config,
        Arc::new(SystemDesktop::new()),
        text_llm,
        vision_llm,
    );
    let engine = state.engine.clone();

    let shutdown_token = CancellationToken::new();
    let mut server = tokio::spawn(run_server(state, shutdown_token.clone().cancelled_owned()));

    let result = tokio::select! {
        joined = &mut server => joined.context("HTTP server task failed")?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, initiating graceful shutdown");
            shutdown_token.cancel();
            engine.shutdown().await;
            match tokio::time::timeout(SERVER_STOP_TIMEOUT, &mut server).await {
                Ok(joined) => joined.context("HTTP server task failed")?,
                Err(_) => {
                    warn!("HTTP server did not stop in time, aborting");
                    server.abort();
                    Ok(())
                }
            }
        }
    };

    engine.shutdown().await;
    info!("HTTP server stopped: {:?}", result);
    result
}
