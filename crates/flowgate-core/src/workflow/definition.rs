//! Workflow and step definitions

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::value::StateMap;

/// Immutable description of a multi-step business process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Workflow identifier (looked up case-insensitively)
    pub id: String,

    /// Display name
    pub name: String,

    /// Owning department, used for policy scoping
    pub department: String,

    /// Optional human-readable description
    #[serde(default)]
    pub description: Option<String>,

    /// Steps in execution order
    pub steps: Vec<StepDefinition>,

    /// Event type that starts this workflow from the event feed
    #[serde(default)]
    pub trigger_event_type: Option<String>,

    /// Inputs merged under caller-supplied inputs by the inbound facade
    #[serde(default)]
    pub default_inputs: StateMap,
}

impl WorkflowDefinition {
    /// Create a definition with no steps
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            department: department.into(),
            description: None,
            steps: Vec::new(),
            trigger_event_type: None,
            default_inputs: StateMap::new(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a step
    pub fn with_step(mut self, step: StepDefinition) -> Self {
        self.steps.push(step);
        self
    }

    /// Set the trigger event type
    pub fn with_trigger(mut self, event_type: impl Into<String>) -> Self {
        self.trigger_event_type = Some(event_type.into());
        self
    }

    /// Add a default input
    pub fn with_default_input(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.default_inputs.insert(key.into(), value.into());
        self
    }
}

/// One step of a workflow, bound to an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDefinition {
    /// Step identifier
    pub id: String,

    /// Agent that executes this step
    pub agent_id: String,

    /// Display name; also the action name seen by policies
    pub name: String,

    /// Destination input key -> source key in shared state
    #[serde(default)]
    pub input_mappings: HashMap<String, String>,

    /// Shared-state key evaluated for truthiness; the step runs when absent
    #[serde(default)]
    pub condition: Option<String>,

    /// Step to route to on failure. Recorded only; execution continues in order.
    #[serde(default)]
    pub on_failure_step_id: Option<String>,

    /// Step always stops at approval regardless of policy
    #[serde(default)]
    pub requires_approval: bool,

    /// Step-local deadline
    #[serde(default, with = "option_duration_millis")]
    pub timeout: Option<Duration>,
}

impl StepDefinition {
    /// Create a step with no mappings, condition or timeout
    pub fn new(
        id: impl Into<String>,
        agent_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            agent_id: agent_id.into(),
            name: name.into(),
            input_mappings: HashMap::new(),
            condition: None,
            on_failure_step_id: None,
            requires_approval: false,
            timeout: None,
        }
    }

    /// Map shared-state key `source` to agent input `dest`
    pub fn with_input(mut self, dest: impl Into<String>, source: impl Into<String>) -> Self {
        self.input_mappings.insert(dest.into(), source.into());
        self
    }

    /// Run only when shared-state key `key` is truthy
    pub fn with_condition(mut self, key: impl Into<String>) -> Self {
        self.condition = Some(key.into());
        self
    }

    /// Record an on-failure step reference
    pub fn with_on_failure(mut self, step_id: impl Into<String>) -> Self {
        self.on_failure_step_id = Some(step_id.into());
        self
    }

    /// Require human approval before the agent runs
    pub fn with_approval(mut self) -> Self {
        self.requires_approval = true;
        self
    }

    /// Bound the agent invocation
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

mod option_duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.map(|d| d.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}
