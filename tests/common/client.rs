//! HTTP and WebSocket client helpers

#![allow(dead_code)]

use super::constants::*;
use futures::StreamExt;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message};

pub type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

pub struct TestClient {
    pub base_url: String,
    client: reqwest::Client,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    async fn post_json(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await
            .expect("POST request failed")
    }

    /// GET / and return the stats body.
    pub async fn stats(&self) -> Value {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("GET / failed")
            .json()
            .await
            .expect("Invalid stats body")
    }

    pub async fn submit_steps(&self, steps: Value) -> Value {
        self.post_json("/steps", json!({ "steps": steps }))
            .await
            .json()
            .await
            .expect("Invalid /steps body")
    }

    pub async fn run_request(&self, request: &str) -> Value {
        self.post_json("/run_request", json!({ "request": request }))
            .await
            .json()
            .await
            .expect("Invalid /run_request body")
    }

    pub async fn tool_call(&self, tool_name: &str, parameters: Value) -> Value {
        self.post_json(
            "/tool_call",
            json!({ "tool_name": tool_name, "parameters": parameters }),
        )
        .await
        .json()
        .await
        .expect("Invalid /tool_call body")
    }

    /// Raw POST, for checking how malformed bodies are rejected.
    pub async fn post_raw(&self, path: &str, body: &'static str) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .expect("POST request failed")
    }

    /// Poll / until no run is active.
    pub async fn wait_until_idle(&self) {
        let result = timeout(Duration::from_millis(RUN_TIMEOUT_MS), async {
            while self.stats().await["is_running"] == true {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(result.is_ok(), "Run did not finish in time");
    }

    pub async fn observer_count(&self) -> u64 {
        self.stats().await["observers"]
            .as_u64()
            .expect("Missing observer count")
    }

    /// Connect to the progress channel and wait until the server has
    /// registered the new observer.
    pub async fn connect_ws(&self) -> WsStream {
        let before = self.observer_count().await;
        let ws_url = self.base_url.replace("http://", "ws://") + "/step-updates";
        let (ws_stream, _) = connect_async(ws_url)
            .await
            .expect("Failed to connect to WebSocket");

        let registered = timeout(Duration::from_millis(RUN_TIMEOUT_MS), async {
            while self.observer_count().await <= before {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(registered.is_ok(), "Observer was not registered in time");
        ws_stream
    }
}

/// Next progress event on the socket, or None on timeout or close.
pub async fn next_event(ws: &mut WsStream) -> Option<Value> {
    let result = timeout(Duration::from_millis(RUN_TIMEOUT_MS), async {
        while let Some(Ok(msg)) = ws.next().await {
            if let Message::Text(text) = msg {
                if let Ok(json) = serde_json::from_str::<Value>(&text) {
                    return Some(json);
                }
            }
        }
        None
    })
    .await;

    result.ok().flatten()
}
