//! Audit trail contract

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::StateMap;

/// Default number of entries returned by a query
pub const DEFAULT_AUDIT_LIMIT: usize = 100;

/// Outcome recorded for an audited action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Allowed,
    Denied,
    EscalatedToHuman,
    ApprovedByHuman,
    AutoApproved,
    AuditOnly,
}

/// One immutable audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub entry_id: String,
    pub workflow_instance_id: String,
    pub step_id: String,
    pub agent_id: String,

    /// Department of the owning workflow
    #[serde(default)]
    pub department: Option<String>,

    pub action: String,
    pub outcome: AuditOutcome,
    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub policy_id: Option<String>,

    #[serde(default)]
    pub justification: Option<String>,

    #[serde(default)]
    pub approved_by: Option<String>,

    #[serde(default)]
    pub details: StateMap,
}

impl AuditEntry {
    /// Create an entry stamped with a fresh id and the current time
    pub fn new(
        workflow_instance_id: impl Into<String>,
        step_id: impl Into<String>,
        agent_id: impl Into<String>,
        action: impl Into<String>,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            entry_id: crate::new_id(),
            workflow_instance_id: workflow_instance_id.into(),
            step_id: step_id.into(),
            agent_id: agent_id.into(),
            department: None,
            action: action.into(),
            outcome,
            timestamp: Utc::now(),
            policy_id: None,
            justification: None,
            approved_by: None,
            details: StateMap::new(),
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_policy(mut self, policy_id: impl Into<String>) -> Self {
        self.policy_id = Some(policy_id.into());
        self
    }

    pub fn with_justification(mut self, justification: impl Into<String>) -> Self {
        self.justification = Some(justification.into());
        self
    }

    pub fn with_detail(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Filter for audit queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditQuery {
    pub workflow_instance_id: Option<String>,
    pub agent_id: Option<String>,
    pub department: Option<String>,

    /// Inclusive lower bound
    pub from: Option<DateTime<Utc>>,

    /// Inclusive upper bound
    pub to: Option<DateTime<Utc>>,

    pub limit: usize,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            workflow_instance_id: None,
            agent_id: None,
            department: None,
            from: None,
            to: None,
            limit: DEFAULT_AUDIT_LIMIT,
        }
    }
}

impl AuditQuery {
    pub fn for_instance(instance_id: impl Into<String>) -> Self {
        Self {
            workflow_instance_id: Some(instance_id.into()),
            ..Self::default()
        }
    }

    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_range(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Whether `entry` passes every filter
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(id) = &self.workflow_instance_id {
            if &entry.workflow_instance_id != id {
                return false;
            }
        }
        if let Some(agent) = &self.agent_id {
            if &entry.agent_id != agent {
                return false;
            }
        }
        if let Some(department) = &self.department {
            match &entry.department {
                Some(d) if d.eq_ignore_ascii_case(department) => {}
                _ => return false,
            }
        }
        if self.from.is_some_and(|from| entry.timestamp < from) {
            return false;
        }
        if self.to.is_some_and(|to| entry.timestamp > to) {
            return false;
        }
        true
    }
}

/// Error from audit log operations
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit store unavailable: {0}")]
    Unavailable(String),
}

/// Append-only audit log
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append an entry
    async fn record(&self, entry: AuditEntry) -> Result<(), AuditError>;

    /// Matching entries, newest first, truncated to the query limit
    async fn query(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>, AuditError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(instance: &str, agent: &str, department: &str) -> AuditEntry {
        AuditEntry::new(instance, "step", agent, "Do Work", AuditOutcome::Allowed)
            .with_department(department)
    }

    #[test]
    fn test_default_limit() {
        assert_eq!(AuditQuery::default().limit, 100);
    }

    #[test]
    fn test_matches_filters() {
        let e = entry("inst-1", "agent-a", "Finance");

        assert!(AuditQuery::default().matches(&e));
        assert!(AuditQuery::for_instance("inst-1").matches(&e));
        assert!(!AuditQuery::for_instance("inst-2").matches(&e));
        assert!(AuditQuery::default().with_agent("agent-a").matches(&e));
        assert!(!AuditQuery::default().with_agent("agent-b").matches(&e));
        assert!(AuditQuery::default().with_department("finance").matches(&e));
        assert!(!AuditQuery::default().with_department("Sales").matches(&e));
    }

    #[test]
    fn test_matches_inclusive_range() {
        let e = entry("inst-1", "agent-a", "Finance");
        let at = e.timestamp;

        assert!(AuditQuery::default().with_range(Some(at), Some(at)).matches(&e));
        assert!(!AuditQuery::default()
            .with_range(Some(at + Duration::seconds(1)), None)
            .matches(&e));
        assert!(!AuditQuery::default()
            .with_range(None, Some(at - Duration::seconds(1)))
            .matches(&e));
    }

    #[test]
    fn test_entry_without_department_fails_department_filter() {
        let e = AuditEntry::new("i", "s", "a", "Do Work", AuditOutcome::AuditOnly);
        assert!(!AuditQuery::default().with_department("HR").matches(&e));
    }
}
