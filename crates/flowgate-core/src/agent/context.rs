//! Agent execution context

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::value::StateMap;

/// Context handed to an agent for one step
///
/// `shared_state` is the instance's own state map, not a copy: writes made
/// by the agent are visible to later steps and to the final instance.
pub struct AgentContext<'a> {
    /// Workflow instance that owns this step
    pub instance_id: String,

    /// Step being executed
    pub step_id: String,

    /// Inputs assembled from the step's input mappings
    pub inputs: StateMap,

    /// Direct access to the instance's shared state
    pub shared_state: &'a mut StateMap,

    /// When the context was built
    pub timestamp: DateTime<Utc>,

    /// Fires on caller cancellation or when the step's timeout elapses
    cancel: CancellationToken,
}

impl<'a> AgentContext<'a> {
    /// Create a new agent context
    pub fn new(
        instance_id: impl Into<String>,
        step_id: impl Into<String>,
        inputs: StateMap,
        shared_state: &'a mut StateMap,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            step_id: step_id.into(),
            inputs,
            shared_state,
            timestamp: Utc::now(),
            cancel,
        }
    }

    /// Look up a mapped input
    pub fn input(&self, key: &str) -> Option<&Value> {
        self.inputs.get(key)
    }

    /// Check if the invocation was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token to await for cooperative cancellation
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }
}

impl std::fmt::Debug for AgentContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentContext")
            .field("instance_id", &self.instance_id)
            .field("step_id", &self.step_id)
            .field("inputs", &self.inputs)
            .field("shared_state_keys", &self.shared_state.len())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
