//! Agent registry

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use flowgate_core::{Agent, AgentIdentity};

use crate::error::RegistryError;

/// Maps agent ids (case-insensitive) to agent implementations
#[derive(Default)]
pub struct AgentRegistry {
    agents: Vec<Arc<dyn Agent>>,
    index: HashMap<String, usize>,
}

impl AgentRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent under its identity's id
    ///
    /// Registering an id again replaces the earlier agent.
    pub fn register(&mut self, agent: Arc<dyn Agent>) {
        let key = agent.identity().agent_id.to_lowercase();
        match self.index.get(&key) {
            Some(&slot) => self.agents[slot] = agent,
            None => {
                self.index.insert(key, self.agents.len());
                self.agents.push(agent);
            }
        }
    }

    /// Register a concrete agent
    pub fn register_agent<A: Agent + 'static>(&mut self, agent: A) {
        self.register(Arc::new(agent));
    }

    /// Look up an agent by id
    pub fn resolve(&self, agent_id: &str) -> Result<Arc<dyn Agent>, RegistryError> {
        self.index
            .get(&agent_id.to_lowercase())
            .map(|&slot| Arc::clone(&self.agents[slot]))
            .ok_or_else(|| RegistryError::AgentNotRegistered(agent_id.to_string()))
    }

    /// Check if an agent id is registered
    pub fn contains(&self, agent_id: &str) -> bool {
        self.index.contains_key(&agent_id.to_lowercase())
    }

    /// Identities of all agents in registration order
    pub fn list(&self) -> Vec<AgentIdentity> {
        self.agents.iter().map(|a| a.identity().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentRegistry")
            .field(
                "agents",
                &self
                    .agents
                    .iter()
                    .map(|a| a.identity().agent_id.as_str())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
