//! Department workflows run end to end against the demo catalog

use flowgate_core::{
    AuditOutcome, AuditQuery, StateMap, StepStatus, WorkflowInstance, WorkflowStatus,
};
use flowgate_worker::bootstrap;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

fn inputs(pairs: &[(&str, Value)]) -> StateMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn statuses(instance: &WorkflowInstance) -> Vec<(&str, StepStatus)> {
    instance
        .step_executions
        .iter()
        .map(|s| (s.step_id.as_str(), s.status))
        .collect()
}

#[test_log::test(tokio::test)]
async fn stalled_deal_recovery_completes() {
    let platform = bootstrap::platform();
    let instance = platform
        .trigger_workflow(
            "sales-stalled-deal-recovery",
            inputs(&[
                ("dealId", json!("OPP-9")),
                ("daysStalled", json!(21)),
                ("amount", json!(185000)),
            ]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(instance.status, WorkflowStatus::Completed);
    assert_eq!(instance.completed_steps(), 4);
    assert_eq!(instance.state["RiskLevel"], json!("High"));
    let revised = instance.state["RevisedAmount"].as_f64().unwrap();
    assert!((revised - 166_500.0).abs() < 1e-6);

    // Every decision falls through to the global audit rule
    let entries = platform
        .query_audit(&AuditQuery::for_instance(&instance.instance_id))
        .await
        .unwrap();
    assert_eq!(entries.len(), 8);
    assert!(entries
        .iter()
        .filter(|e| e.policy_id.as_deref() == Some("global-audit"))
        .all(|e| e.outcome == AuditOutcome::AuditOnly));
}

#[test_log::test(tokio::test)]
async fn high_risk_contract_escalates_redline() {
    let platform = bootstrap::platform();
    let instance = platform
        .trigger_workflow(
            "legal-contract-review",
            StateMap::new(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(instance.status, WorkflowStatus::Completed);
    assert_eq!(
        statuses(&instance),
        vec![
            ("classify-contract", StepStatus::Completed),
            ("redline-contract", StepStatus::AwaitingApproval),
        ]
    );

    let dashboard = platform.dashboard().await.unwrap();
    assert_eq!(dashboard.human_escalations, 1);
    assert_eq!(dashboard.policy_denials, 0);
}

#[test_log::test(tokio::test)]
async fn approval_steps_do_not_run_their_agents() {
    let platform = bootstrap::platform();
    let cancel = CancellationToken::new();

    for workflow_id in ["finance-month-end-reconciliation", "hr-attrition-prevention"] {
        let instance = platform
            .trigger_workflow(workflow_id, StateMap::new(), &cancel)
            .await
            .unwrap();

        assert_eq!(instance.status, WorkflowStatus::Completed, "{workflow_id}");
        let last = instance.step_executions.last().unwrap();
        assert_eq!(last.status, StepStatus::AwaitingApproval);
        assert!(last.outputs.is_empty());
    }

    let summary = platform.impact_summary(None, None).await.unwrap();
    assert_eq!(summary.total_workflows_executed, 2);
    assert_eq!(summary.total_steps_automated, 2);
    // 12000 + 8h and 25000 + 5h at the hourly rate
    assert_eq!(summary.total_cost_saved, Decimal::from(12_000 + 1_200 + 25_000 + 750));
    assert_eq!(summary.by_department.len(), 2);
}

#[test_log::test(tokio::test)]
async fn vendor_counter_below_approval_threshold() {
    let platform = bootstrap::platform();
    let instance = platform
        .trigger_workflow(
            "procurement-vendor-negotiation",
            inputs(&[("vendorId", json!("VENDOR-7")), ("priceIncrease", json!(9.0))]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(instance.status, WorkflowStatus::Completed);
    assert_eq!(instance.state["SavingsIfAccepted"], json!(40000.0));
    assert_eq!(instance.state["CounterProposalSent"], json!(5.0));
}

#[test_log::test(tokio::test)]
async fn demo_events_trigger_every_workflow() {
    let platform = bootstrap::platform();
    let orchestrator = platform.orchestrator();
    let cancel = CancellationToken::new();

    let mut completed = Vec::new();
    for event in bootstrap::demo_events() {
        let handle = orchestrator.dispatch(event, &cancel).unwrap();
        let instance = handle.await.unwrap().unwrap();
        assert_ne!(instance.status, WorkflowStatus::Failed, "{}", instance.workflow_id);
        assert!(instance.state.contains_key("_eventId"));
        completed.push(instance.workflow_id);
    }

    let mut expected: Vec<String> = platform
        .list_workflows()
        .iter()
        .map(|w| w.id.clone())
        .collect();
    expected.sort();
    completed.sort();
    assert_eq!(completed, expected);

    let alerts = platform
        .query_audit(&AuditQuery::default().with_agent("it-security-response"))
        .await
        .unwrap();
    assert!(alerts
        .iter()
        .any(|e| e.policy_id.as_deref() == Some("it-security-alert")));
}
