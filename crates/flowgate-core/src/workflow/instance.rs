//! Workflow instances and step execution records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StepDefinition;
use crate::agent::ImpactRecord;
use crate::value::StateMap;

/// Workflow instance status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// Instance created but not started
    Pending,

    /// Steps are being executed
    Running,

    /// Defined for completeness; instances never end in this status
    AwaitingApproval,

    /// All steps visited without an unrecovered failure
    Completed,

    /// A step failed without an on-failure reference, or a fault escaped a step
    Failed,

    /// The caller's cancellation signal fired
    Cancelled,
}

impl WorkflowStatus {
    /// Whether no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::AwaitingApproval => write!(f, "awaiting_approval"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Step execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    AwaitingApproval,
    Completed,
    Failed,
    Skipped,
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::AwaitingApproval => write!(f, "awaiting_approval"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// One run of a workflow definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowInstance {
    /// Generated instance identifier
    pub instance_id: String,

    /// Definition this instance runs
    pub workflow_id: String,

    pub status: WorkflowStatus,

    pub created_at: DateTime<Utc>,

    pub completed_at: Option<DateTime<Utc>>,

    /// Shared state seeded from the caller's inputs and enriched by step outputs
    pub state: StateMap,

    /// One record per visited step, in definition order
    pub step_executions: Vec<StepExecution>,

    pub failure_reason: Option<String>,
}

impl WorkflowInstance {
    /// Create a pending instance seeded with `inputs`
    pub fn new(workflow_id: impl Into<String>, inputs: StateMap) -> Self {
        Self {
            instance_id: crate::new_id(),
            workflow_id: workflow_id.into(),
            status: WorkflowStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
            state: inputs,
            step_executions: Vec::new(),
            failure_reason: None,
        }
    }

    /// Mark as failed with a reason
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.status = WorkflowStatus::Failed;
        self.failure_reason = Some(reason.into());
    }

    /// Find the execution record for a step
    pub fn step(&self, step_id: &str) -> Option<&StepExecution> {
        self.step_executions.iter().find(|s| s.step_id == step_id)
    }

    /// Number of steps that ran to completion
    pub fn completed_steps(&self) -> usize {
        self.step_executions
            .iter()
            .filter(|s| s.status == StepStatus::Completed)
            .count()
    }
}

/// Record of one step within an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepExecution {
    pub step_id: String,
    pub agent_id: String,
    pub status: StepStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,

    /// Outputs reported by the agent; empty unless the agent ran
    pub outputs: StateMap,

    pub error_message: Option<String>,

    /// Impact the agent attributed to this step
    #[serde(default)]
    pub impact: Option<ImpactRecord>,
}

impl StepExecution {
    /// Start a record for `step`
    pub fn start(step: &StepDefinition) -> Self {
        Self {
            step_id: step.id.clone(),
            agent_id: step.agent_id.clone(),
            status: StepStatus::Pending,
            started_at: Utc::now(),
            completed_at: None,
            outputs: StateMap::new(),
            error_message: None,
            impact: None,
        }
    }

    /// Record for a step whose condition was false
    pub fn skipped(step: &StepDefinition) -> Self {
        let mut execution = Self::start(step);
        execution.status = StepStatus::Skipped;
        execution
    }

    /// Mark as failed with an error message
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = StepStatus::Failed;
        self.error_message = Some(message.into());
    }

    /// Stamp the completion time
    pub fn finish(&mut self) {
        self.completed_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_instance_is_pending_with_inputs() {
        let mut inputs = StateMap::new();
        inputs.insert("Amount".into(), json!(100));

        let instance = WorkflowInstance::new("wf", inputs);

        assert_eq!(instance.status, WorkflowStatus::Pending);
        assert_eq!(instance.instance_id.len(), 32);
        assert_eq!(instance.state["Amount"], json!(100));
        assert!(instance.step_executions.is_empty());
        assert!(instance.completed_at.is_none());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!WorkflowStatus::Pending.is_terminal());
        assert!(!WorkflowStatus::Running.is_terminal());
        assert!(!WorkflowStatus::AwaitingApproval.is_terminal());
        assert!(WorkflowStatus::Completed.is_terminal());
        assert!(WorkflowStatus::Failed.is_terminal());
        assert!(WorkflowStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_skipped_step() {
        let step = StepDefinition::new("s1", "agent-a", "Step One");
        let exec = StepExecution::skipped(&step);

        assert_eq!(exec.status, StepStatus::Skipped);
        assert_eq!(exec.agent_id, "agent-a");
        assert!(exec.outputs.is_empty());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_value(StepStatus::AwaitingApproval).unwrap(),
            json!("awaiting_approval")
        );
        assert_eq!(WorkflowStatus::Cancelled.to_string(), "cancelled");
    }
}
