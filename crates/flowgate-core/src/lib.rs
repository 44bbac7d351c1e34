// Flowgate Core
//
// Data model and collaborator contracts shared by the policy engine, the
// workflow engine and the worker binary.
//
// Key design decisions:
// - Shared state, inputs and outputs are `StateMap` (JSON value maps)
// - Agents, the policy engine, the audit log, the impact tracker and the
//   event bus are traits so backends can be swapped
// - In-memory event bus and impact tracker live here; the rule-based policy
//   engine and the in-memory audit log live in flowgate-governance

pub mod agent;
pub mod events;
pub mod governance;
pub mod impact;
pub mod value;
pub mod workflow;

// Re-exports for convenience
pub use agent::{
    Agent, AgentContext, AgentError, AgentIdentity, AgentResult, ImpactRecord, RiskTier,
};
pub use events::{
    EventBus, EventBusError, EventSeverity, EventStream, InMemoryEventBus, SystemEvent,
};
pub use governance::{
    AuditEntry, AuditError, AuditLog, AuditOutcome, AuditQuery, GovernancePolicy, PolicyAction,
    PolicyDecision, PolicyEngine, PolicyError, PolicyEvaluationContext, PolicyRule, PolicyScope,
    PolicySeverity,
};
pub use impact::{
    DepartmentImpact, ImpactError, ImpactMetrics, ImpactSummary, ImpactTracker,
    InMemoryImpactTracker,
};
pub use value::{StateMap, StateMapExt};
pub use workflow::{
    StepDefinition, StepExecution, StepStatus, WorkflowDefinition, WorkflowInstance,
    WorkflowStatus,
};

/// Generate a new time-ordered identifier (UUID v7, no dashes)
pub fn new_id() -> String {
    uuid::Uuid::now_v7().simple().to_string()
}
