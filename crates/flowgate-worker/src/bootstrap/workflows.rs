//! Department workflows and the events that trigger them

use std::time::Duration;

use flowgate_core::{EventSeverity, StepDefinition, SystemEvent, WorkflowDefinition};
use flowgate_engine::WorkflowRegistry;

const fn minutes(n: u64) -> Duration {
    Duration::from_secs(n * 60)
}

pub fn workflow_registry() -> WorkflowRegistry {
    let mut registry = WorkflowRegistry::new();
    for workflow in [
        sales_stalled_deal_recovery(),
        finance_month_end_reconciliation(),
        legal_contract_review(),
        it_security_incident_response(),
        procurement_vendor_negotiation(),
        hr_attrition_prevention(),
    ] {
        registry.register(workflow);
    }
    registry
}

fn sales_stalled_deal_recovery() -> WorkflowDefinition {
    WorkflowDefinition::new("sales-stalled-deal-recovery", "Stalled Deal Recovery", "Sales")
        .with_description(
            "Analyzes stalled deals, revises pricing, sends documentation and books a follow-up",
        )
        .with_trigger("sales.opportunity.stalled")
        .with_step(
            StepDefinition::new("analyze-deal", "sales-deal-analysis", "Analyze Stalled Deal")
                .with_input("DealId", "dealId")
                .with_input("DaysStalled", "daysStalled")
                .with_input("Amount", "amount")
                .with_timeout(minutes(5)),
        )
        .with_step(
            StepDefinition::new("revise-pricing", "sales-pricing", "Generate Revised Pricing")
                .with_input("Amount", "Amount")
                .with_timeout(minutes(2)),
        )
        .with_step(
            StepDefinition::new("send-docs", "sales-documents", "Send Security Documentation")
                .with_timeout(minutes(2)),
        )
        .with_step(
            StepDefinition::new("book-followup", "sales-followup", "Book Follow-Up and Notify")
                .with_input("RevisedAmount", "RevisedAmount")
                .with_timeout(minutes(2)),
        )
}

fn finance_month_end_reconciliation() -> WorkflowDefinition {
    WorkflowDefinition::new(
        "finance-month-end-reconciliation",
        "Month-End Revenue Reconciliation",
        "Finance",
    )
    .with_description("Detects revenue recognition inconsistencies and flags risky entries")
    .with_trigger("finance.month-end.triggered")
    .with_step(
        StepDefinition::new(
            "detect-inconsistencies",
            "finance-revenue-recognition",
            "Detect Revenue Inconsistencies",
        )
        .with_timeout(minutes(10)),
    )
    .with_step(
        StepDefinition::new(
            "flag-risk",
            "finance-risk-flagging",
            "Flag Risky Entries and Generate Variance Report",
        )
        .with_approval()
        .with_timeout(minutes(5)),
    )
}

fn legal_contract_review() -> WorkflowDefinition {
    WorkflowDefinition::new("legal-contract-review", "Automated Contract Review", "Legal")
        .with_description("Classifies contracts, redlines non-standard terms, escalates high risk")
        .with_trigger("legal.contract.received")
        .with_step(
            StepDefinition::new(
                "classify-contract",
                "legal-contract-classification",
                "Classify and Extract Contract Clauses",
            )
            .with_input("ContractType", "contractType")
            .with_input("ContractId", "contractId")
            .with_timeout(minutes(5)),
        )
        .with_step(
            StepDefinition::new(
                "redline-contract",
                "legal-contract-redline",
                "Redline Non-Standard Terms",
            )
            .with_input("OverallRiskScore", "OverallRiskScore")
            .with_timeout(minutes(5)),
        )
}

fn it_security_incident_response() -> WorkflowDefinition {
    WorkflowDefinition::new("it-security-incident-response", "Security Incident Response", "IT")
        .with_description("Correlates identity and behavior logs, restricts access, opens a ticket")
        .with_trigger("it.security.anomaly-detected")
        .with_step(
            StepDefinition::new(
                "analyze-threat",
                "it-security-response",
                "Correlate and Analyze Security Threat",
            )
            .with_input("UserId", "userId")
            .with_input("AnomalyScore", "anomalyScore")
            .with_timeout(minutes(3)),
        )
        .with_step(
            StepDefinition::new(
                "create-ticket",
                "it-ticketing",
                "Create Incident Ticket and Notify CISO",
            )
            .with_timeout(minutes(2)),
        )
}

fn procurement_vendor_negotiation() -> WorkflowDefinition {
    WorkflowDefinition::new(
        "procurement-vendor-negotiation",
        "Vendor Price Negotiation",
        "Procurement",
    )
    .with_description("Checks escalation clauses against benchmarks and sends a counterproposal")
    .with_trigger("procurement.vendor.price-increase")
    .with_step(
        StepDefinition::new(
            "analyze-pricing",
            "procurement-vendor-negotiation",
            "Analyze Pricing and Generate Counter",
        )
        .with_input("VendorId", "vendorId")
        .with_input("PriceIncrease", "priceIncrease")
        .with_timeout(minutes(5)),
    )
    .with_step(
        StepDefinition::new(
            "send-counter",
            "procurement-comms",
            "Send Counterproposal to Vendor",
        )
        .with_input("CounterProposal", "CounterProposal")
        .with_timeout(minutes(2)),
    )
}

fn hr_attrition_prevention() -> WorkflowDefinition {
    WorkflowDefinition::new("hr-attrition-prevention", "Proactive Attrition Prevention", "HR")
        .with_description("Detects attrition risk and schedules retention packages and check-ins")
        .with_trigger("hr.attrition.risk-spike")
        .with_step(
            StepDefinition::new(
                "detect-attrition",
                "hr-attrition-detection",
                "Detect Attrition Risk and Analyze Factors",
            )
            .with_input("TeamId", "teamId")
            .with_timeout(minutes(5)),
        )
        .with_step(
            StepDefinition::new(
                "retention-action",
                "hr-retention-action",
                "Generate Retention Packages and Schedule Check-ins",
            )
            .with_input("AtRiskEmployees", "AtRiskEmployees")
            .with_approval()
            .with_timeout(minutes(3)),
        )
}

/// One trigger event per department workflow
pub fn demo_events() -> Vec<SystemEvent> {
    vec![
        SystemEvent::new("crm", "sales.opportunity.stalled", "Sales")
            .with_payload("dealId", "OPP-2041")
            .with_payload("daysStalled", 21)
            .with_payload("amount", 185_000),
        SystemEvent::new("erp", "finance.month-end.triggered", "Finance")
            .with_payload("period", "2026-09"),
        SystemEvent::new("clm", "legal.contract.received", "Legal")
            .with_payload("contractId", "CTR-7713")
            .with_payload("contractType", "Master Services Agreement"),
        SystemEvent::new("siem", "it.security.anomaly-detected", "IT")
            .with_payload("userId", "jdoe")
            .with_payload("anomalyScore", 88.5)
            .with_severity(EventSeverity::Anomaly),
        SystemEvent::new("procurement-portal", "procurement.vendor.price-increase", "Procurement")
            .with_payload("vendorId", "VENDOR-118")
            .with_payload("priceIncrease", 9.0)
            .with_severity(EventSeverity::Warning),
        SystemEvent::new("hris", "hr.attrition.risk-spike", "HR")
            .with_payload("teamId", "eng-platform")
            .with_severity(EventSeverity::Warning),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_demo_event_has_a_workflow() {
        let registry = workflow_registry();
        assert_eq!(registry.len(), 6);

        for event in demo_events() {
            let workflow = registry
                .find_by_trigger(&event.event_type)
                .unwrap_or_else(|| panic!("no workflow for {}", event.event_type));
            assert!(workflow.department.eq_ignore_ascii_case(&event.department));
        }
    }

    #[test]
    fn test_steps_reference_catalog_agents() {
        let agents = super::super::agent_registry();
        for workflow in workflow_registry().list() {
            for step in &workflow.steps {
                assert!(agents.contains(&step.agent_id), "missing agent {}", step.agent_id);
                assert!(step.timeout.is_some());
            }
        }
    }
}
