//! Rule-based policy engine

use async_trait::async_trait;
use flowgate_core::{
    GovernancePolicy, PolicyDecision, PolicyEngine, PolicyError, PolicyEvaluationContext,
    PolicyScope,
};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::condition::Condition;

/// Policy engine evaluating [`Condition`] rules in scope and severity order
///
/// Policies are append-only. Evaluation considers active `Department`
/// policies for the context's department first, then active `Global`
/// policies, in registration order within each group. Rules are tried from
/// most to least severe and the first match decides.
#[derive(Debug, Default)]
pub struct RuleBasedPolicyEngine {
    policies: RwLock<Vec<GovernancePolicy>>,
}

impl RuleBasedPolicyEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine preloaded with `policies`
    pub fn with_policies(policies: impl IntoIterator<Item = GovernancePolicy>) -> Self {
        Self {
            policies: RwLock::new(policies.into_iter().collect()),
        }
    }

    /// Number of registered policies, active or not
    pub fn policy_count(&self) -> usize {
        self.policies.read().len()
    }

    /// Snapshot of the policies that apply to `department`, in evaluation order
    fn applicable(&self, department: &str) -> Vec<GovernancePolicy> {
        let department = department.to_lowercase();
        let mut applicable: Vec<GovernancePolicy> = self
            .policies
            .read()
            .iter()
            .filter(|p| p.is_active)
            .filter(|p| match p.scope {
                PolicyScope::Global => true,
                PolicyScope::Department => p
                    .department
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase() == department),
                PolicyScope::Workflow | PolicyScope::Agent => false,
            })
            .cloned()
            .collect();
        applicable.sort_by_key(|p| match p.scope {
            PolicyScope::Department => 0,
            _ => 1,
        });
        applicable
    }
}

#[async_trait]
impl PolicyEngine for RuleBasedPolicyEngine {
    fn add_policy(&self, policy: GovernancePolicy) {
        debug!(policy_id = %policy.policy_id, rules = policy.rules.len(), "Adding policy");
        self.policies.write().push(policy);
    }

    async fn evaluate(
        &self,
        context: &PolicyEvaluationContext,
    ) -> Result<PolicyDecision, PolicyError> {
        for policy in self.applicable(&context.department) {
            let mut rules: Vec<_> = policy.rules.iter().collect();
            rules.sort_by(|a, b| b.severity.cmp(&a.severity));

            for rule in rules {
                let matched = Condition::parse(&rule.condition)
                    .matches(context)
                    .map_err(|e| PolicyError::InvalidPattern {
                        rule_id: rule.rule_id.clone(),
                        pattern: rule.condition.clone(),
                        message: e.to_string(),
                    })?;

                if matched {
                    info!(
                        policy_id = %policy.policy_id,
                        rule_id = %rule.rule_id,
                        action = %rule.action,
                        "Policy rule matched: {}",
                        rule.description
                    );
                    return Ok(PolicyDecision {
                        action: rule.action,
                        policy_id: policy.policy_id.clone(),
                        rule_id: rule.rule_id.clone(),
                        reason: rule.description.clone(),
                    });
                }
            }
        }

        Ok(PolicyDecision::default_allow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgate_core::{PolicyAction, PolicyRule, PolicySeverity, StateMap};
    use serde_json::{json, Value};

    fn context(
        department: &str,
        action: &str,
        params: &[(&str, Value)],
    ) -> PolicyEvaluationContext {
        PolicyEvaluationContext {
            agent_id: "agent".to_string(),
            workflow_instance_id: "inst".to_string(),
            step_id: "step".to_string(),
            action: action.to_string(),
            department: department.to_string(),
            parameters: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<StateMap>(),
        }
    }

    fn rule(id: &str, condition: &str, action: PolicyAction) -> PolicyRule {
        PolicyRule::new(id, format!("rule {id}"), condition, action)
    }

    #[tokio::test]
    async fn test_default_allow_when_nothing_matches() {
        let engine = RuleBasedPolicyEngine::new();
        let decision = engine.evaluate(&context("Sales", "Anything", &[])).await.unwrap();
        assert_eq!(decision, PolicyDecision::default_allow());
    }

    #[tokio::test]
    async fn test_param_threshold() {
        let engine = RuleBasedPolicyEngine::new();
        engine.add_policy(
            GovernancePolicy::global("big-amounts", "Big Amounts")
                .with_rule(rule("r1", "param:amount:gt:100000", PolicyAction::RequireApproval)),
        );

        let high = engine
            .evaluate(&context("Finance", "Pay", &[("amount", json!(250000))]))
            .await
            .unwrap();
        assert_eq!(high.action, PolicyAction::RequireApproval);
        assert_eq!(high.policy_id, "big-amounts");
        assert_eq!(high.rule_id, "r1");
        assert_eq!(high.reason, "rule r1");

        let low = engine
            .evaluate(&context("Finance", "Pay", &[("amount", json!(50000))]))
            .await
            .unwrap();
        assert_eq!(low, PolicyDecision::default_allow());
    }

    #[tokio::test]
    async fn test_department_policy_wins_over_global() {
        // Global registered first so registration order alone would pick it
        let engine = RuleBasedPolicyEngine::with_policies([
            GovernancePolicy::global("global", "Global").with_rule(
                rule("g", "always", PolicyAction::Audit).with_severity(PolicySeverity::Critical),
            ),
            GovernancePolicy::department("sales", "Sales", "Sales").with_rule(
                rule("s", "always", PolicyAction::Deny).with_severity(PolicySeverity::Low),
            ),
        ]);

        let decision = engine.evaluate(&context("SALES", "x", &[])).await.unwrap();
        assert_eq!(decision.policy_id, "sales");
        assert_eq!(decision.action, PolicyAction::Deny);

        let other = engine.evaluate(&context("Legal", "x", &[])).await.unwrap();
        assert_eq!(other.policy_id, "global");
    }

    #[tokio::test]
    async fn test_rules_tried_most_severe_first() {
        let policy = GovernancePolicy::global("p", "P")
            .with_rule(
                rule("low", "always", PolicyAction::Audit).with_severity(PolicySeverity::Low),
            )
            .with_rule(
                rule("crit", "always", PolicyAction::Deny).with_severity(PolicySeverity::Critical),
            )
            .with_rule(rule("med", "always", PolicyAction::Alert));
        let engine = RuleBasedPolicyEngine::with_policies([policy]);

        let decision = engine.evaluate(&context("IT", "x", &[])).await.unwrap();
        assert_eq!(decision.rule_id, "crit");
    }

    #[tokio::test]
    async fn test_equal_severity_keeps_declaration_order() {
        let engine = RuleBasedPolicyEngine::with_policies([GovernancePolicy::global("p", "P")
            .with_rule(rule("first", "always", PolicyAction::Audit))
            .with_rule(rule("second", "always", PolicyAction::Deny))]);

        let decision = engine.evaluate(&context("IT", "x", &[])).await.unwrap();
        assert_eq!(decision.rule_id, "first");
    }

    #[tokio::test]
    async fn test_inactive_and_unevaluated_scopes_ignored() {
        let mut workflow_scoped = GovernancePolicy::global("wf", "Workflow");
        workflow_scoped.scope = PolicyScope::Workflow;
        let workflow_scoped = workflow_scoped.with_rule(rule("w", "always", PolicyAction::Deny));

        let engine = RuleBasedPolicyEngine::with_policies([
            GovernancePolicy::global("off", "Off")
                .with_rule(rule("o", "always", PolicyAction::Deny))
                .inactive(),
            workflow_scoped,
            GovernancePolicy::department("hr", "HR", "HR")
                .with_rule(rule("h", "always", PolicyAction::Deny)),
        ]);

        let decision = engine.evaluate(&context("Finance", "x", &[])).await.unwrap();
        assert_eq!(decision, PolicyDecision::default_allow());
    }

    #[tokio::test]
    async fn test_duplicate_policy_ids_are_both_kept() {
        let engine = RuleBasedPolicyEngine::new();
        engine.add_policy(
            GovernancePolicy::global("dup", "A")
                .with_rule(rule("a", "agent:nobody", PolicyAction::Deny)),
        );
        engine.add_policy(
            GovernancePolicy::global("dup", "B")
                .with_rule(rule("b", "always", PolicyAction::Alert)),
        );

        assert_eq!(engine.policy_count(), 2);
        let decision = engine.evaluate(&context("IT", "x", &[])).await.unwrap();
        assert_eq!(decision.rule_id, "b");
    }

    #[tokio::test]
    async fn test_invalid_pattern_is_reported() {
        let engine = RuleBasedPolicyEngine::with_policies([GovernancePolicy::global("bad", "Bad")
            .with_rule(rule("r", "action:(unclosed", PolicyAction::Deny))]);

        let err = engine.evaluate(&context("IT", "x", &[])).await.unwrap_err();
        assert!(matches!(err, PolicyError::InvalidPattern { ref rule_id, .. } if rule_id == "r"));
    }
}
