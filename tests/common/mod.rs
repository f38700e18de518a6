//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestClient, TestServer};
//!
//! #[tokio::test]
//! async fn test_home() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let stats = client.stats().await;
//!     assert_eq!(stats["is_running"], false);
//! }
//! ```

mod client;
mod constants;
mod fakes;
mod server;

// Public API - this is what tests import
#[allow(unused_imports)]
pub use client::{next_event, TestClient, WsStream};
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use fakes::{RecordingDesktop, ScriptedLlm};
#[allow(unused_imports)]
pub use server::{TestServer, TestServerOptions};
