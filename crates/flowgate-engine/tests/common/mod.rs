//! Shared fixtures for engine integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use flowgate_core::{
    Agent, AgentContext, AgentError, AgentIdentity, AgentResult, GovernancePolicy, PolicyEngine,
    StateMap,
};
use flowgate_engine::{AgentRegistry, WorkflowEngine};
use flowgate_governance::{InMemoryAuditLog, RuleBasedPolicyEngine};
use serde_json::Value;

/// What a scripted agent does when invoked
#[derive(Clone)]
pub enum Behavior {
    /// Succeed with these outputs
    Succeed(StateMap),
    /// Return an unsuccessful result carrying an `Attempted` output
    Fail(String),
    /// Return an unsuccessful result with no error message
    FailQuietly,
    /// Raise a fault
    Fault(String),
    /// Sleep without observing cancellation, then succeed
    Sleep(Duration),
    /// Wait for cancellation and report it
    WaitForCancel,
    /// Write a key straight into shared state, then succeed with no outputs
    WriteShared(String, Value),
    /// Succeed, echoing the mapped inputs as outputs
    EchoInputs,
}

pub struct ScriptedAgent {
    identity: AgentIdentity,
    behavior: Behavior,
    calls: AtomicUsize,
}

impl ScriptedAgent {
    pub fn new(agent_id: &str, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            identity: AgentIdentity::new(agent_id, agent_id, "Test"),
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn succeeding(agent_id: &str, outputs: &[(&str, Value)]) -> Arc<Self> {
        Self::new(agent_id, Behavior::Succeed(state(outputs)))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    async fn execute(&self, ctx: &mut AgentContext<'_>) -> Result<AgentResult, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Succeed(outputs) => Ok(AgentResult::success(outputs.clone())),
            Behavior::Fail(message) => {
                let mut result = AgentResult::failure(message.clone());
                result.outputs.insert("Attempted".into(), Value::Bool(true));
                Ok(result)
            }
            Behavior::FailQuietly => Ok(AgentResult {
                error: None,
                ..AgentResult::failure(String::new())
            }),
            Behavior::Fault(message) => Err(AgentError::fault(message.clone())),
            Behavior::Sleep(duration) => {
                tokio::time::sleep(*duration).await;
                Ok(AgentResult::success(StateMap::new()))
            }
            Behavior::WaitForCancel => {
                ctx.cancellation().cancelled().await;
                Err(AgentError::Cancelled)
            }
            Behavior::WriteShared(key, value) => {
                ctx.shared_state.insert(key.clone(), value.clone());
                Ok(AgentResult::success(StateMap::new()))
            }
            Behavior::EchoInputs => Ok(AgentResult::success(ctx.inputs.clone())),
        }
    }
}

pub fn state(pairs: &[(&str, Value)]) -> StateMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

pub struct Harness {
    pub engine: WorkflowEngine,
    pub agents: Arc<AgentRegistry>,
    pub audit: Arc<InMemoryAuditLog>,
    pub policies: Arc<RuleBasedPolicyEngine>,
}

pub fn harness(agents: &[Arc<ScriptedAgent>], policies: Vec<GovernancePolicy>) -> Harness {
    let mut registry = AgentRegistry::new();
    for agent in agents {
        registry.register(agent.clone());
    }
    let agents = Arc::new(registry);

    let audit = Arc::new(InMemoryAuditLog::new());
    let policy_engine = Arc::new(RuleBasedPolicyEngine::new());
    for policy in policies {
        policy_engine.add_policy(policy);
    }

    let engine = WorkflowEngine::new(agents.clone(), policy_engine.clone(), audit.clone());
    Harness {
        engine,
        agents,
        audit,
        policies: policy_engine,
    }
}
