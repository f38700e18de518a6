use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use intervene_server::agent::{
    CompletionOptions, Copilot, CopilotOutcome, LlmProvider, OllamaProvider, VisionAnalyzer,
};
use intervene_server::config::{DEFAULT_OLLAMA_BASE_URL, DEFAULT_VISION_MODEL};
use intervene_server::desktop::{Desktop, SystemDesktop};
use intervene_server::override_watch::{OverrideHandle, OverrideWatch};
use intervene_server::tasks::{EmailDrafter, SpreadsheetMaterializer, UiPacing};

#[derive(Parser, Debug)]
#[command(version, about = "Looks at the screen and performs the suggested task")]
struct CliArgs {
    /// Base URL of the Ollama server.
    #[clap(long, env = "OLLAMA_BASE_URL", default_value = DEFAULT_OLLAMA_BASE_URL)]
    pub ollama_base_url: String,

    /// Model used to describe screenshots.
    #[clap(long, env = "OLLAMA_VISION_MODEL", default_value = DEFAULT_VISION_MODEL)]
    pub vision_model: String,

    /// Seconds to wait for human input before acting.
    #[clap(long, default_value_t = 2)]
    pub standby_secs: u64,
}

#[cfg(feature = "input-hook")]
fn start_watch() -> Result<OverrideHandle> {
    use intervene_server::override_watch::RdevSource;
    OverrideWatch::start(RdevSource).context("Failed to start override watch")
}

#[cfg(not(feature = "input-hook"))]
fn start_watch() -> Result<OverrideHandle> {
    warn!("Built without the input-hook feature, manual override cannot be detected");
    Ok(OverrideWatch::start_detached())
}

#[tokio::main]
async fn main() -> Result<()> {
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

    let desktop: Arc<dyn Desktop> = Arc::new(SystemDesktop::new());
    let vision_llm: Arc<dyn LlmProvider> = Arc::new(OllamaProvider::new(
        &cli_args.ollama_base_url,
        &cli_args.vision_model,
    ));

    let copilot = Copilot::new(
        desktop.clone(),
        Arc::new(VisionAnalyzer::new(vision_llm, CompletionOptions::default())),
        Arc::new(EmailDrafter::new(desktop.clone(), UiPacing::default())),
        Arc::new(SpreadsheetMaterializer::new(desktop)),
    )
    .with_standby(Duration::from_secs(cli_args.standby_secs));

    let watch = start_watch()?;
    let outcome = copilot.run(&watch).await;
    watch.stop();

    match outcome.context("Copilot task failed")? {
        CopilotOutcome::Cancelled => info!("Nothing done"),
        CopilotOutcome::Completed { analysis, result } => {
            info!("Analysis: {}", analysis);
            info!("Result: {}", result);
        }
    }
    Ok(())
}
