//! Governance contracts
//!
//! Policies authorize each step before it runs; every authorization and
//! completion is written to an append-only audit log.

mod audit;
mod policy;

pub use audit::{AuditEntry, AuditError, AuditLog, AuditOutcome, AuditQuery, DEFAULT_AUDIT_LIMIT};
pub use policy::{
    GovernancePolicy, PolicyAction, PolicyDecision, PolicyEngine, PolicyError,
    PolicyEvaluationContext, PolicyRule, PolicyScope, PolicySeverity,
};
