//! WebSocket route handler.
//!
//! Handles WebSocket upgrade, message loop, and cleanup.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::progress::{ObserverId, ProgressEvent};
use crate::server::state::{GuardedBroadcaster, GuardedWorkflowEngine};

/// WebSocket upgrade handler for `GET /step-updates`.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(engine): State<GuardedWorkflowEngine>,
    State(broadcaster): State<GuardedBroadcaster>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, engine, broadcaster))
}

/// Handle an established WebSocket connection.
async fn handle_socket(
    socket: WebSocket,
    engine: GuardedWorkflowEngine,
    broadcaster: GuardedBroadcaster,
) {
    let (observer_id, outgoing_rx) = broadcaster.register().await;
    debug!("WebSocket connected: observer {}", observer_id);

    // Registered before reading the state, so no event of the current run
    // can fall between the snapshot and the subscription.
    let initial = engine.snapshot().active_step().map(ProgressEvent::current);

    let (ws_sink, ws_stream) = socket.split();
    let outgoing_handle = tokio::spawn(forward_outgoing(ws_sink, outgoing_rx, initial));

    process_incoming(ws_stream, observer_id).await;

    debug!("WebSocket disconnected: observer {}", observer_id);
    outgoing_handle.abort();
    broadcaster.unregister(observer_id).await;
}

/// Forward events from the observer channel to the WebSocket.
async fn forward_outgoing(
    mut ws_sink: futures::stream::SplitSink<WebSocket, Message>,
    mut outgoing_rx: mpsc::Receiver<ProgressEvent>,
    initial: Option<ProgressEvent>,
) {
    if let Some(event) = initial {
        if send_event(&mut ws_sink, &event).await.is_err() {
            return;
        }
    }

    while let Some(event) = outgoing_rx.recv().await {
        if send_event(&mut ws_sink, &event).await.is_err() {
            break;
        }
    }
}

async fn send_event(
    ws_sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    event: &ProgressEvent,
) -> Result<(), axum::Error> {
    match serde_json::to_string(event) {
        Ok(json) => ws_sink.send(Message::Text(json.into())).await,
        Err(e) => {
            error!("Failed to serialize progress event: {}", e);
            Ok(())
        }
    }
}

/// Drain incoming frames until the peer goes away. Payloads are liveness
/// pings and carry nothing.
async fn process_incoming(
    mut ws_stream: futures::stream::SplitStream<WebSocket>,
    observer_id: ObserverId,
) {
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("Received close frame from observer {}", observer_id);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                debug!("WebSocket error for observer {}: {}", observer_id, e);
                break;
            }
        }
    }
}
