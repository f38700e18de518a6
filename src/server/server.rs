use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use super::log_requests;
use super::state::{GuardedDecomposer, GuardedToolRegistry, GuardedWorkflowEngine, ServerState};
use super::websocket::ws_handler;
use crate::agent::steps_or_fallback;
use crate::steps::Step;
use crate::workflow::SubmitOutcome;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: String,
    pub is_running: bool,
    /// Index of the last step reached, kept after the run ends.
    pub current_step: Option<usize>,
    pub observers: usize,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
struct StepsBody {
    pub steps: Vec<Step>,
}

#[derive(Deserialize, Debug)]
struct RunRequestBody {
    pub request: String,
}

#[derive(Deserialize, Debug)]
struct ToolCallBody {
    pub tool_name: String,
    #[serde(default)]
    pub parameters: Value,
}

#[derive(Serialize, Debug)]
struct RunRequestResponse {
    #[serde(flatten)]
    outcome: SubmitOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    steps: Option<Vec<Step>>,
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
enum ToolCallResponse {
    Ok { success: bool, result: String },
    Err { success: bool, error: String },
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let execution = state.engine.snapshot();
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION").to_string(),
        is_running: execution.is_running,
        current_step: execution.current_step,
        observers: state.engine.broadcaster().observer_count().await,
    };
    Json(stats)
}

async fn post_steps(
    State(engine): State<GuardedWorkflowEngine>,
    Json(body): Json<StepsBody>,
) -> impl IntoResponse {
    info!("Received {} steps", body.steps.len());
    Json(engine.submit(body.steps))
}

async fn run_request(
    State(engine): State<GuardedWorkflowEngine>,
    State(decomposer): State<GuardedDecomposer>,
    Json(body): Json<RunRequestBody>,
) -> impl IntoResponse {
    // Checked again by submit; this only avoids decomposing for nothing.
    if engine.is_running() {
        return Json(RunRequestResponse {
            outcome: SubmitOutcome {
                accepted: false,
                message: "Execution already in progress".to_string(),
            },
            steps: None,
        });
    }

    let steps = steps_or_fallback(decomposer.decompose(&body.request).await);
    let outcome = engine.submit(steps.clone());
    let steps = outcome.accepted.then_some(steps);
    Json(RunRequestResponse { outcome, steps })
}

async fn tool_call(
    State(tools): State<GuardedToolRegistry>,
    Json(body): Json<ToolCallBody>,
) -> impl IntoResponse {
    info!("Tool call request: {}", body.tool_name);
    let response = match tools.invoke(&body.tool_name, body.parameters).await {
        Ok(result) => ToolCallResponse::Ok {
            success: true,
            result,
        },
        Err(e) => {
            error!("Error executing tool {}: {}", body.tool_name, e);
            ToolCallResponse::Err {
                success: false,
                error: e.to_string(),
            }
        }
    };
    Json(response)
}

pub fn make_app(state: ServerState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/steps", post(post_steps))
        .route("/run_request", post(run_request))
        .route("/tool_call", post(tool_call))
        .route("/step-updates", get(ws_handler))
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn run_server<F>(state: ServerState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let address = format!("{}:{}", state.config.host, state.config.port);
    let app = make_app(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;
    info!("Ready to serve at {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")
}
