//! Shared test constants

#![allow(dead_code)]

pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

/// Upper bound for waiting on progress events or for a run to finish.
pub const RUN_TIMEOUT_MS: u64 = 5000;

/// Reply the scripted LLM gives by default: a single browser step.
pub const DECOMPOSED_STEPS_REPLY: &str = r#"Here is the plan:
[{"type": "browser", "instruction": "open https://ex.com"}]"#;

/// Reply the scripted vision model gives by default.
pub const SCREEN_DESCRIPTION: &str = "A text editor with a half written document.";
