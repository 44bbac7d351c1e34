//! Policy evaluation over a realistic set of department and global policies

use flowgate_core::{
    GovernancePolicy, PolicyAction, PolicyDecision, PolicyEngine, PolicyEvaluationContext,
    PolicyRule, PolicySeverity, StateMap,
};
use flowgate_governance::RuleBasedPolicyEngine;
use serde_json::json;

fn engine() -> RuleBasedPolicyEngine {
    RuleBasedPolicyEngine::with_policies([
        GovernancePolicy::global("transfer-guard", "Financial Transfer Guard").with_rule(
            PolicyRule::new(
                "block-transfer",
                "Direct fund transfers are blocked",
                "action:.*transfer.*",
                PolicyAction::Deny,
            )
            .with_severity(PolicySeverity::Critical),
        ),
        GovernancePolicy::global("global-audit", "Global Audit").with_rule(
            PolicyRule::new("audit-all", "Audit every action", "always", PolicyAction::Audit)
                .with_severity(PolicySeverity::Low),
        ),
        GovernancePolicy::department("sales-discount", "Discount Threshold", "Sales").with_rule(
            PolicyRule::new(
                "discount-approval",
                "Discounts above 20% need approval",
                "param:ProposedDiscount:gt:0.20",
                PolicyAction::RequireApproval,
            )
            .with_severity(PolicySeverity::High),
        ),
        GovernancePolicy::global("security-alert", "Security Alert").with_rule(
            PolicyRule::new(
                "alert-security-agent",
                "Security responses raise an alert",
                "agent:it-security-response",
                PolicyAction::Alert,
            )
            .with_severity(PolicySeverity::Critical),
        ),
    ])
}

fn context(
    department: &str,
    agent: &str,
    action: &str,
    params: StateMap,
) -> PolicyEvaluationContext {
    PolicyEvaluationContext {
        agent_id: agent.to_string(),
        workflow_instance_id: "inst-1".to_string(),
        step_id: "step-1".to_string(),
        action: action.to_string(),
        department: department.to_string(),
        parameters: params,
    }
}

#[test_log::test(tokio::test)]
async fn sales_discount_above_threshold_requires_approval() {
    let mut params = StateMap::new();
    params.insert("ProposedDiscount".into(), json!(0.25));

    let decision = engine()
        .evaluate(&context("Sales", "sales-pricing", "Generate Pricing", params))
        .await
        .unwrap();

    assert_eq!(decision.action, PolicyAction::RequireApproval);
    assert_eq!(decision.policy_id, "sales-discount");
}

#[test_log::test(tokio::test)]
async fn sales_discount_below_threshold_falls_through_to_global_audit() {
    let mut params = StateMap::new();
    params.insert("ProposedDiscount".into(), json!(0.10));

    let decision = engine()
        .evaluate(&context("Sales", "sales-pricing", "Generate Pricing", params))
        .await
        .unwrap();

    assert_eq!(decision.action, PolicyAction::Audit);
    assert_eq!(decision.policy_id, "global-audit");
}

#[test_log::test(tokio::test)]
async fn transfer_is_denied_in_any_department() {
    for department in ["Finance", "HR", "Procurement"] {
        let decision = engine()
            .evaluate(&context(department, "any", "Execute Wire Transfer", StateMap::new()))
            .await
            .unwrap();
        assert_eq!(decision.action, PolicyAction::Deny, "department {department}");
    }
}

#[test_log::test(tokio::test)]
async fn global_policies_keep_registration_order() {
    // Both global policies match; the audit policy is registered first and
    // severity only orders rules within a policy
    let decision = engine()
        .evaluate(&context("IT", "it-security-response", "Contain Threat", StateMap::new()))
        .await
        .unwrap();

    assert_eq!(decision.action, PolicyAction::Audit);
}

#[test_log::test(tokio::test)]
async fn no_policies_means_default_allow() {
    let decision = RuleBasedPolicyEngine::new()
        .evaluate(&context("IT", "a", "b", StateMap::new()))
        .await
        .unwrap();

    assert_eq!(decision, PolicyDecision::default_allow());
}
