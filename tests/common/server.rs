//! Test server lifecycle management
//!
//! Each test gets an isolated server wired with a recording desktop and a
//! scripted LLM, bound to a random local port.

use super::constants::*;
use super::fakes::{RecordingDesktop, ScriptedLlm};
use intervene_server::app::build_state;
use intervene_server::config::{AppConfig, OllamaSettings};
use intervene_server::server::{make_app, RequestsLoggingLevel};
use intervene_server::tasks::UiPacing;
use intervene_server::workflow::EngineSettings;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Knobs for a test server.
pub struct TestServerOptions {
    pub step_delay: Duration,
    pub step_gap: Duration,
    pub llm: ScriptedLlm,
}

impl Default for TestServerOptions {
    fn default() -> Self {
        Self {
            step_delay: Duration::ZERO,
            step_gap: Duration::ZERO,
            llm: ScriptedLlm::replying(DECOMPOSED_STEPS_REPLY),
        }
    }
}

/// Test server instance
///
/// When dropped, the server gracefully shuts down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Desktop the handlers act on, for asserting side effects
    pub desktop: Arc<RecordingDesktop>,

    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server with zero step delays and the default LLM reply.
    pub async fn spawn() -> Self {
        Self::spawn_with(TestServerOptions::default()).await
    }

    pub async fn spawn_with(options: TestServerOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        let config = AppConfig {
            host: "127.0.0.1".to_string(),
            port,
            logging_level: RequestsLoggingLevel::None,
            engine: EngineSettings {
                step_delay: options.step_delay,
                step_gap: options.step_gap,
            },
            ui_pacing: UiPacing::none(),
            ollama: OllamaSettings {
                base_url: "http://localhost:11434".to_string(),
                llm_model: "scripted".to_string(),
                vision_model: "scripted".to_string(),
                temperature: 0.3,
                timeout_secs: 5,
            },
        };

        let desktop = Arc::new(RecordingDesktop::default());
        let state = build_state(
            &config,
            desktop.clone(),
            Arc::new(options.llm),
            Arc::new(ScriptedLlm::replying(SCREEN_DESCRIPTION)),
        );
        let app = make_app(state);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            desktop,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the / endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
