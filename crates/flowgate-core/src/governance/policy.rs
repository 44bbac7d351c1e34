//! Governance policies and the policy engine contract

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::value::StateMap;

/// Where a policy applies
///
/// Only `Global` and `Department` policies are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyScope {
    Global,
    Department,
    Workflow,
    Agent,
}

/// Decision a matching rule produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyAction {
    Allow,
    Deny,
    RequireApproval,
    Audit,
    Alert,
}

impl std::fmt::Display for PolicyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Deny => write!(f, "deny"),
            Self::RequireApproval => write!(f, "require_approval"),
            Self::Audit => write!(f, "audit"),
            Self::Alert => write!(f, "alert"),
        }
    }
}

/// Rule severity; more severe rules are tried first
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PolicySeverity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// A single condition -> action rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRule {
    pub rule_id: String,
    pub description: String,

    /// Condition expression, e.g. `action:.*transfer.*` or `param:Amount:gt:100000`
    pub condition: String,

    pub action: PolicyAction,

    #[serde(default)]
    pub severity: PolicySeverity,
}

impl PolicyRule {
    pub fn new(
        rule_id: impl Into<String>,
        description: impl Into<String>,
        condition: impl Into<String>,
        action: PolicyAction,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            description: description.into(),
            condition: condition.into(),
            action,
            severity: PolicySeverity::default(),
        }
    }

    pub fn with_severity(mut self, severity: PolicySeverity) -> Self {
        self.severity = severity;
        self
    }
}

/// A named, scoped collection of rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernancePolicy {
    pub policy_id: String,
    pub name: String,

    /// Department matched case-insensitively for `Department` scope
    #[serde(default)]
    pub department: Option<String>,

    pub scope: PolicyScope,
    pub rules: Vec<PolicyRule>,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl GovernancePolicy {
    /// Active global policy with no rules
    pub fn global(policy_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            policy_id: policy_id.into(),
            name: name.into(),
            department: None,
            scope: PolicyScope::Global,
            rules: Vec::new(),
            is_active: true,
        }
    }

    /// Active department policy with no rules
    pub fn department(
        policy_id: impl Into<String>,
        name: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            department: Some(department.into()),
            scope: PolicyScope::Department,
            ..Self::global(policy_id, name)
        }
    }

    pub fn with_rule(mut self, rule: PolicyRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// Input to one authorization check
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyEvaluationContext {
    pub agent_id: String,
    pub workflow_instance_id: String,
    pub step_id: String,

    /// Action name; the step's display name during execution
    pub action: String,

    pub department: String,

    /// Shared state at the time of the check
    #[serde(default)]
    pub parameters: StateMap,
}

/// Result of one authorization check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub action: PolicyAction,
    pub policy_id: String,
    pub rule_id: String,
    pub reason: String,
}

impl PolicyDecision {
    /// Decision when no rule matches
    pub fn default_allow() -> Self {
        Self {
            action: PolicyAction::Allow,
            policy_id: "default".to_string(),
            rule_id: "default-allow".to_string(),
            reason: "No matching policy rules; defaulting to allow".to_string(),
        }
    }
}

/// Error from policy evaluation
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// An `action:` condition is not a valid regular expression
    #[error("invalid pattern '{pattern}' in rule {rule_id}: {message}")]
    InvalidPattern {
        rule_id: String,
        pattern: String,
        message: String,
    },

    /// Policy backend could not be reached
    #[error("policy engine unavailable: {0}")]
    Unavailable(String),
}

/// Authorizes steps against registered policies
#[async_trait]
pub trait PolicyEngine: Send + Sync {
    /// Register a policy; duplicates are kept
    fn add_policy(&self, policy: GovernancePolicy);

    /// Return the single decision for `context`
    async fn evaluate(
        &self,
        context: &PolicyEvaluationContext,
    ) -> Result<PolicyDecision, PolicyError>;
}
