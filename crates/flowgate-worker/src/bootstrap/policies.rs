//! Governance policies for the department workflows

use flowgate_core::{GovernancePolicy, PolicyAction, PolicyRule, PolicySeverity};
use flowgate_governance::RuleBasedPolicyEngine;

/// Policy engine loaded with the platform's standing policies
///
/// Registration order matters among global policies: `global-audit` comes
/// first and its `always` rule matches every context, so no later global
/// rule is ever reached.
pub fn policy_engine() -> RuleBasedPolicyEngine {
    RuleBasedPolicyEngine::with_policies(policies())
}

fn policies() -> Vec<GovernancePolicy> {
    vec![
        GovernancePolicy::global("global-audit", "Global Audit Trail").with_rule(
            PolicyRule::new(
                "audit-all",
                "Audit all agent actions",
                "always",
                PolicyAction::Audit,
            )
            .with_severity(PolicySeverity::Low),
        ),
        GovernancePolicy::global("finance-transfer-block", "Financial Transfer Guard").with_rule(
            PolicyRule::new(
                "block-transfers",
                "Block automated financial transfers without human approval",
                "action:.*transfer.*",
                PolicyAction::Deny,
            )
            .with_severity(PolicySeverity::Critical),
        ),
        GovernancePolicy::department("sales-discount-limit", "Sales Discount Threshold", "Sales")
            .with_rule(
                PolicyRule::new(
                    "discount-over-20pct",
                    "Require approval for discounts exceeding 20%",
                    "param:ProposedDiscount:gt:0.20",
                    PolicyAction::RequireApproval,
                )
                .with_severity(PolicySeverity::High),
            ),
        GovernancePolicy::department(
            "finance-reclass-approval",
            "Revenue Reclassification Approval",
            "Finance",
        )
        .with_rule(
            PolicyRule::new(
                "reclass-approval",
                "Require human review for revenue reclassification",
                "action:.*Flag Risky.*",
                PolicyAction::RequireApproval,
            )
            .with_severity(PolicySeverity::High),
        ),
        GovernancePolicy::department("legal-high-risk", "High-Risk Contract Escalation", "Legal")
            .with_rule(
                PolicyRule::new(
                    "high-risk-contract",
                    "Escalate high-risk contracts to senior counsel",
                    "param:OverallRiskScore:gt:7.0",
                    PolicyAction::RequireApproval,
                )
                .with_severity(PolicySeverity::High),
            ),
        GovernancePolicy::department("it-security-alert", "Security Action Alert", "IT").with_rule(
            PolicyRule::new(
                "security-alert",
                "Alert on all security incident response actions",
                "agent:it-security-response",
                PolicyAction::Alert,
            )
            .with_severity(PolicySeverity::Critical),
        ),
        GovernancePolicy::department(
            "procurement-high-value",
            "High-Value Negotiation Approval",
            "Procurement",
        )
        .with_rule(
            PolicyRule::new(
                "high-value-counter",
                "Require approval for counter-offers with over $50K impact",
                "param:SavingsIfAccepted:gt:50000",
                PolicyAction::RequireApproval,
            )
            .with_severity(PolicySeverity::High),
        ),
        GovernancePolicy::department("hr-retention-approval", "Retention Package Approval", "HR")
            .with_rule(
                PolicyRule::new(
                    "retention-approval",
                    "Require VP approval for retention packages",
                    "action:.*Retention.*",
                    PolicyAction::RequireApproval,
                )
                .with_severity(PolicySeverity::High),
            ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgate_core::{PolicyEngine, PolicyEvaluationContext};
    use serde_json::json;

    fn context(department: &str, agent_id: &str, action: &str) -> PolicyEvaluationContext {
        PolicyEvaluationContext {
            agent_id: agent_id.to_string(),
            action: action.to_string(),
            department: department.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_eight_policies_loaded() {
        assert_eq!(policy_engine().policy_count(), 8);
    }

    #[tokio::test]
    async fn test_global_audit_shadows_transfer_guard() {
        let engine = policy_engine();
        let decision = engine
            .evaluate(&context("Finance", "finance-risk-flagging", "Initiate Wire Transfer"))
            .await
            .unwrap();

        assert_eq!(decision.policy_id, "global-audit");
        assert_eq!(decision.action, PolicyAction::Audit);
    }

    #[tokio::test]
    async fn test_department_rules_take_precedence() {
        let engine = policy_engine();

        let it = engine
            .evaluate(&context("IT", "it-security-response", "Correlate"))
            .await
            .unwrap();
        assert_eq!(it.action, PolicyAction::Alert);

        let mut legal = context("Legal", "legal-contract-redline", "Redline Non-Standard Terms");
        legal.parameters.insert("OverallRiskScore".to_string(), json!(7.2));
        let legal = engine.evaluate(&legal).await.unwrap();
        assert_eq!(legal.policy_id, "legal-high-risk");
        assert_eq!(legal.action, PolicyAction::RequireApproval);
    }
}
