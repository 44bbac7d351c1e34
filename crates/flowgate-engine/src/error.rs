//! Engine error types

use std::time::Duration;

use flowgate_core::{AgentError, AuditError, EventBusError, ImpactError, PolicyError};

/// Errors from registry lookups
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Agent '{0}' is not registered")]
    AgentNotRegistered(String),

    #[error("Workflow '{0}' is not registered")]
    WorkflowNotRegistered(String),
}

/// Errors raised while executing a workflow
///
/// `PolicyDenied` and `StepTimedOut` only ever become a step's error message.
/// Every other variant escapes the step and ends the instance.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Denied by policy {policy_id}: {reason}")]
    PolicyDenied { policy_id: String, reason: String },

    #[error("Step timed out after {0:?}")]
    StepTimedOut(Duration),

    #[error("{0}")]
    AgentUnregistered(RegistryError),

    #[error("agent {agent_id} faulted: {source}")]
    AgentFault {
        agent_id: String,
        #[source]
        source: AgentError,
    },

    #[error("workflow run cancelled")]
    Cancelled,

    #[error("policy evaluation failed: {0}")]
    Policy(#[from] PolicyError),

    #[error("audit log write failed: {0}")]
    Audit(#[from] AuditError),
}

/// Errors from the platform facade
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Audit(#[from] AuditError),

    #[error(transparent)]
    Impact(#[from] ImpactError),

    #[error(transparent)]
    EventBus(#[from] EventBusError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let denied = EngineError::PolicyDenied {
            policy_id: "finance-transfer-block".into(),
            reason: "No transfers".into(),
        };
        assert_eq!(denied.to_string(), "Denied by policy finance-transfer-block: No transfers");

        let timed_out = EngineError::StepTimedOut(Duration::from_secs(30));
        assert_eq!(timed_out.to_string(), "Step timed out after 30s");

        let missing = EngineError::AgentUnregistered(RegistryError::AgentNotRegistered("x".into()));
        assert_eq!(missing.to_string(), "Agent 'x' is not registered");
    }
}
