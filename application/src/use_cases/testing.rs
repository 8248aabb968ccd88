//! Scripted backend shared by the use case tests.

use crate::ports::agent_backend::{AgentBackend, BackendError, BackendRequest, BackendStream};
use async_trait::async_trait;
use council_domain::{
    AgentDefinition, AgentRegistry, BackendEvent, Provenance, RunSummary, StopReason, TokenUsage,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// What the backend does for one invocation
#[derive(Debug, Clone)]
pub enum Script {
    /// Stream these items
    Events(Vec<Result<BackendEvent, BackendError>>),
    /// Fail the invocation itself
    Fail(BackendError),
    /// Panic inside `invoke`
    Panic,
}

/// Backend that replays scripts per agent id, in order
pub struct ScriptedBackend {
    scripts: Mutex<HashMap<String, VecDeque<Script>>>,
    requests: Mutex<Vec<BackendRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, agent_id: &str, script: Script) {
        self.scripts
            .lock()
            .unwrap()
            .entry(agent_id.to_string())
            .or_default()
            .push_back(script);
    }

    pub fn requests(&self) -> Vec<BackendRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_script(&self, agent_id: &str) -> Script {
        self.scripts
            .lock()
            .unwrap()
            .get_mut(agent_id)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| completed("(no more responses)", 0.0))
    }
}

#[async_trait]
impl AgentBackend for ScriptedBackend {
    async fn invoke(&self, request: &BackendRequest) -> Result<BackendStream, BackendError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.next_script(&request.agent_id) {
            Script::Events(items) => Ok(BackendStream::from_events(items)),
            Script::Fail(e) => Err(e),
            Script::Panic => panic!("scripted panic for {}", request.agent_id),
        }
    }
}

pub fn summary(cost_usd: f64, num_turns: u32, stop_reason: StopReason) -> RunSummary {
    RunSummary {
        session_id: "session-1".to_string(),
        cost_usd,
        num_turns,
        usage: TokenUsage::new(10, 20, None),
        stop_reason,
    }
}

/// A run that answers `text` in one turn and reports `cost_usd`.
pub fn completed(text: &str, cost_usd: f64) -> Script {
    Script::Events(vec![
        Ok(BackendEvent::Text(text.to_string())),
        Ok(BackendEvent::Completed(summary(cost_usd, 1, StopReason::EndTurn))),
    ])
}

/// Registry with one builtin agent per id, instructed "You are {id}."
pub fn registry_with(ids: &[&str]) -> Arc<AgentRegistry> {
    let mut registry = AgentRegistry::new();
    for id in ids {
        registry.register(AgentDefinition::new(
            id,
            format!("{} agent", id),
            format!("You are {}.", id),
            Provenance::Builtin,
        ));
    }
    Arc::new(registry)
}
