//! Desktop-automation orchestrator.
//!
//! Accepts step lists (or free-text requests decomposed by a local language
//! model), executes them one at a time against the desktop and streams
//! progress to WebSocket observers.

pub mod agent;
pub mod app;
pub mod config;
pub mod desktop;
pub mod override_watch;
pub mod progress;
pub mod server;
pub mod steps;
pub mod tasks;
pub mod workflow;
