use axum::extract::FromRef;
use std::sync::Arc;
use std::time::Instant;

use crate::agent::{AgentToolRegistry, TaskDecomposer};
use crate::progress::ProgressBroadcaster;
use crate::workflow::WorkflowEngine;

use super::ServerConfig;

pub type GuardedWorkflowEngine = Arc<WorkflowEngine>;
pub type GuardedDecomposer = Arc<dyn TaskDecomposer>;
pub type GuardedToolRegistry = Arc<AgentToolRegistry>;
pub type GuardedBroadcaster = Arc<ProgressBroadcaster>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub engine: GuardedWorkflowEngine,
    pub decomposer: GuardedDecomposer,
    pub tools: GuardedToolRegistry,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        engine: GuardedWorkflowEngine,
        decomposer: GuardedDecomposer,
        tools: GuardedToolRegistry,
    ) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            engine,
            decomposer,
            tools,
        }
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for GuardedWorkflowEngine {
    fn from_ref(input: &ServerState) -> Self {
        input.engine.clone()
    }
}

impl FromRef<ServerState> for GuardedDecomposer {
    fn from_ref(input: &ServerState) -> Self {
        input.decomposer.clone()
    }
}

impl FromRef<ServerState> for GuardedToolRegistry {
    fn from_ref(input: &ServerState) -> Self {
        input.tools.clone()
    }
}

impl FromRef<ServerState> for GuardedBroadcaster {
    fn from_ref(input: &ServerState) -> Self {
        input.engine.broadcaster().clone()
    }
}
