//! Simulated department agents
//!
//! Each agent answers with canned outputs shaped by its inputs, plus the
//! impact it claims for the run. They stand in for CRM, ERP, CLM, SIEM and
//! HRIS integrations.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration as ChronoDuration, Utc, Weekday};
use flowgate_core::{
    new_id, Agent, AgentContext, AgentError, AgentIdentity, AgentResult, ImpactRecord, RiskTier,
    StateMap, StateMapExt,
};
use flowgate_engine::AgentRegistry;
use rust_decimal::Decimal;
use serde_json::{json, Value};

type Respond = fn(&StateMap) -> (Value, ImpactRecord);

/// Agent whose behavior is a pure function of its inputs
pub struct SimulatedAgent {
    identity: AgentIdentity,
    latency: Duration,
    respond: Respond,
}

impl SimulatedAgent {
    fn new(
        identity: AgentIdentity,
        capabilities: &[&str],
        latency_ms: u64,
        respond: Respond,
    ) -> Self {
        let identity = capabilities
            .iter()
            .fold(identity, |identity, c| identity.with_capability(*c));
        Self {
            identity,
            latency: Duration::from_millis(latency_ms),
            respond,
        }
    }
}

impl std::fmt::Debug for SimulatedAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedAgent")
            .field("agent_id", &self.identity.agent_id)
            .field("latency", &self.latency)
            .finish()
    }
}

#[async_trait]
impl Agent for SimulatedAgent {
    fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    async fn execute(&self, ctx: &mut AgentContext<'_>) -> Result<AgentResult, AgentError> {
        if ctx.is_cancelled() {
            return Err(AgentError::Cancelled);
        }

        let (outputs, impact) = (self.respond)(&ctx.inputs);
        Ok(AgentResult::success(into_state(outputs))
            .with_duration(self.latency)
            .with_impact(impact))
    }
}

/// Registry holding every simulated agent, grouped by department
pub fn agent_registry() -> AgentRegistry {
    let mut registry = AgentRegistry::new();
    for agent in simulated_agents() {
        registry.register_agent(agent);
    }
    registry
}

fn simulated_agents() -> Vec<SimulatedAgent> {
    vec![
        // Sales
        SimulatedAgent::new(
            AgentIdentity::new("sales-deal-analysis", "Deal Analysis Agent", "Sales"),
            &["analyze-opportunity", "detect-stalled-deals", "read-transcripts"],
            2300,
            deal_analysis,
        ),
        SimulatedAgent::new(
            AgentIdentity::new("sales-pricing", "Pricing Revision Agent", "Sales")
                .with_risk_tier(RiskTier::Medium),
            &["generate-pricing", "apply-discounts", "check-thresholds"],
            1100,
            pricing,
        ),
        SimulatedAgent::new(
            AgentIdentity::new("sales-documents", "Document Dispatch Agent", "Sales"),
            &["send-security-docs", "generate-proposals", "attach-compliance"],
            800,
            documents,
        ),
        SimulatedAgent::new(
            AgentIdentity::new("sales-followup", "Follow-Up Scheduling Agent", "Sales"),
            &["book-meetings", "send-notifications", "update-crm"],
            1500,
            follow_up,
        ),
        // Finance
        SimulatedAgent::new(
            AgentIdentity::new(
                "finance-revenue-recognition",
                "Revenue Recognition Agent",
                "Finance",
            )
            .with_risk_tier(RiskTier::High),
            &["detect-inconsistency", "cross-check-contracts", "adjust-booking"],
            4200,
            revenue_recognition,
        ),
        SimulatedAgent::new(
            AgentIdentity::new("finance-risk-flagging", "Financial Risk Flagging Agent", "Finance")
                .with_risk_tier(RiskTier::Medium),
            &["flag-risky-entries", "score-risk", "generate-variance-report"],
            3100,
            risk_flagging,
        ),
        // Legal
        SimulatedAgent::new(
            AgentIdentity::new(
                "legal-contract-classification",
                "Contract Classification Agent",
                "Legal",
            )
            .with_risk_tier(RiskTier::Medium),
            &["classify-contract", "extract-clauses", "compare-playbook"],
            2800,
            contract_classification,
        ),
        SimulatedAgent::new(
            AgentIdentity::new("legal-contract-redline", "Contract Redline Agent", "Legal")
                .with_risk_tier(RiskTier::High),
            &["redline-terms", "score-risk", "route-approval", "auto-execute"],
            3500,
            contract_redline,
        ),
        // IT
        SimulatedAgent::new(
            AgentIdentity::new("it-security-response", "Security Incident Response Agent", "IT")
                .with_risk_tier(RiskTier::Critical),
            &["correlate-logs", "score-risk", "restrict-access", "generate-forensics"],
            1800,
            security_response,
        ),
        SimulatedAgent::new(
            AgentIdentity::new("it-ticketing", "IT Ticketing Agent", "IT"),
            &["create-ticket", "notify-ciso", "track-remediation"],
            1200,
            ticketing,
        ),
        // Procurement
        SimulatedAgent::new(
            AgentIdentity::new(
                "procurement-vendor-negotiation",
                "Vendor Negotiation Agent",
                "Procurement",
            )
            .with_risk_tier(RiskTier::Medium),
            &["compare-benchmarks", "check-escalation-clauses", "generate-counterproposal"],
            2500,
            vendor_negotiation,
        ),
        SimulatedAgent::new(
            AgentIdentity::new(
                "procurement-comms",
                "Procurement Communications Agent",
                "Procurement",
            ),
            &["send-counterproposal", "handle-rejection", "escalate"],
            1000,
            procurement_comms,
        ),
        // HR
        SimulatedAgent::new(
            AgentIdentity::new("hr-attrition-detection", "Attrition Detection Agent", "HR")
                .with_risk_tier(RiskTier::Medium),
            &["detect-sentiment", "analyze-attrition-risk", "compare-compensation"],
            3000,
            attrition_detection,
        ),
        SimulatedAgent::new(
            AgentIdentity::new("hr-retention-action", "Retention Action Agent", "HR")
                .with_risk_tier(RiskTier::Medium),
            &["recommend-retention", "schedule-checkins", "track-kpi"],
            2000,
            retention_action,
        ),
    ]
}

fn deal_analysis(inputs: &StateMap) -> (Value, ImpactRecord) {
    let days_stalled = inputs.get_i64("DaysStalled", 0);
    let outputs = json!({
        "DealId": inputs.get_str("DealId", "OPP-001"),
        "DaysStalled": days_stalled,
        "Amount": inputs.get_f64("Amount", 0.0),
        "Objections": ["pricing", "missing-security-doc"],
        "RiskLevel": if days_stalled > 14 { "High" } else { "Medium" },
        "TranscriptAnalysis":
            "Prospect raised pricing concern and requested SOC2 documentation",
    });
    (
        outputs,
        impact(0.0, 0.0, 45.0, "Deal analysis without manual CRM review"),
    )
}

fn pricing(inputs: &StateMap) -> (Value, ImpactRecord) {
    const MAX_DISCOUNT: f64 = 0.15;
    const PROPOSED_DISCOUNT: f64 = 0.10;

    let amount = inputs.get_f64("Amount", 100_000.0);
    let revised = amount * (1.0 - PROPOSED_DISCOUNT);
    let outputs = json!({
        "OriginalAmount": amount,
        "ProposedDiscount": PROPOSED_DISCOUNT,
        "RevisedAmount": revised,
        "WithinApprovedThreshold": PROPOSED_DISCOUNT <= MAX_DISCOUNT,
        "PricingJustification": "10% discount applied for deal size and competitive pressure",
    });
    (
        outputs,
        impact(0.0, revised, 30.0, "Revised pricing within approved thresholds"),
    )
}

fn documents(inputs: &StateMap) -> (Value, ImpactRecord) {
    let outputs = json!({
        "DocumentsSent": [
            "SOC2-Report.pdf",
            "Security-Whitepaper.pdf",
            "Data-Processing-Agreement.pdf",
        ],
        "DeliveryMethod": "email",
        "Recipient": inputs.get_str("ContactEmail", "prospect@company.com"),
        "DocumentsSentAt": Utc::now().to_rfc3339(),
    });
    (
        outputs,
        impact(0.0, 0.0, 20.0, "Security documentation dispatched"),
    )
}

fn follow_up(inputs: &StateMap) -> (Value, ImpactRecord) {
    let meeting = add_business_days(Utc::now(), 2);
    let outputs = json!({
        "MeetingBooked": true,
        "MeetingTime": meeting.to_rfc3339(),
        "CrmUpdated": true,
        "RepNotified": true,
        "Summary": "Follow-up booked, CRM updated with revised pricing, rep notified",
    });
    (
        outputs,
        impact(
            0.0,
            inputs.get_f64("RevisedAmount", 0.0),
            25.0,
            "Meeting booking, CRM update and rep notification",
        ),
    )
}

fn revenue_recognition(_inputs: &StateMap) -> (Value, ImpactRecord) {
    let outputs = json!({
        "InconsistenciesFound": 2,
        "Inconsistencies": [
            "Contract #4021: Multi-year recognized in Q1",
            "Contract #4087: Milestone billing mismatch",
        ],
        "RecommendedAdjustments": [
            "Reclassify #4021 as deferred revenue",
            "Adjust #4087 milestone to Q2",
        ],
        "ContractsReviewed": 142,
    });
    (
        outputs,
        impact(12_000.0, 0.0, 8.0 * 60.0, "Revenue recognition cross-check"),
    )
}

fn risk_flagging(_inputs: &StateMap) -> (Value, ImpactRecord) {
    let outputs = json!({
        "RiskyEntries": 3,
        "FlaggedItems": [
            { "EntryId": "JE-9821", "Risk": "High", "Reason": "Unusual accrual reversal" },
            { "EntryId": "JE-9834", "Risk": "Medium", "Reason": "Vendor payment exceeds PO" },
            { "EntryId": "JE-9847", "Risk": "Medium", "Reason": "Intercompany mismatch" },
        ],
        "EbitdaImpact": -142_000.0,
        "VarianceExplanation": "EBITDA variance driven by 3 flagged entries totaling $142K",
    });
    (
        outputs,
        impact(8_500.0, 0.0, 6.0 * 60.0, "Risk flagging and variance explanation"),
    )
}

fn contract_classification(inputs: &StateMap) -> (Value, ImpactRecord) {
    let outputs = json!({
        "ContractType": inputs.get_str("ContractType", "SaaS Subscription Agreement"),
        "ClausesExtracted": 24,
        "KeyClauses": [
            { "Clause": "Limitation of Liability", "Status": "Non-Standard", "Risk": "High" },
            { "Clause": "Indemnification", "Status": "Standard", "Risk": "Low" },
            { "Clause": "Data Processing", "Status": "Non-Standard", "Risk": "Medium" },
            { "Clause": "Termination", "Status": "Standard", "Risk": "Low" },
            { "Clause": "IP Assignment", "Status": "Non-Standard", "Risk": "High" },
        ],
        "NonStandardCount": 3,
        "OverallRiskScore": 7.2,
    });
    (
        outputs,
        impact(1_500.0, 0.0, 3.0 * 60.0, "Clause extraction and playbook comparison"),
    )
}

fn contract_redline(inputs: &StateMap) -> (Value, ImpactRecord) {
    let risk_score = inputs.get_f64("OverallRiskScore", 5.0);
    let needs_counsel = risk_score > 6.0;
    let outputs = json!({
        "RedlinesGenerated": 3,
        "Redlines": [
            "Limitation of Liability: Cap at 12 months fees (was uncapped)",
            "Data Processing: Add standard SCCs and DPA reference",
            "IP Assignment: Narrow scope to deliverables only",
        ],
        "RequiresHumanCounsel": needs_counsel,
        "RiskScore": risk_score,
        "Recommendation": if needs_counsel {
            "Route to senior counsel for high-risk clause review"
        } else {
            "Auto-execute with standard redlines applied"
        },
    });
    (
        outputs,
        impact(2_000.0, 0.0, 4.0 * 60.0, "Redlining of non-standard terms"),
    )
}

fn security_response(inputs: &StateMap) -> (Value, ImpactRecord) {
    let risk_score = inputs.get_f64("AnomalyScore", 75.0);
    let restricted = risk_score > 70.0;
    let outputs = json!({
        "UserId": inputs.get_str("UserId", "user-unknown"),
        "RiskScore": risk_score,
        "CorrelatedEvents": 14,
        "AccessRestricted": restricted,
        "RestrictionType": if restricted { "TemporarySuspend" } else { "MonitorOnly" },
        "ForensicReportId": new_id(),
        "AffectedSystems": ["Azure AD", "SharePoint", "GitHub Enterprise"],
        "BehaviorPattern": "Off-hours access from a new location with bulk file download",
    });
    (
        outputs,
        impact(5_000.0, 0.0, 2.0 * 60.0, "Incident correlation and access restriction"),
    )
}

fn ticketing(_inputs: &StateMap) -> (Value, ImpactRecord) {
    let id = new_id();
    let outputs = json!({
        "TicketId": format!("INC-{}", &id[id.len() - 6..]),
        "TicketSystem": "ServiceNow",
        "Priority": "P1",
        "CisoNotified": true,
        "DashboardUpdated": true,
        "RemediationSteps": [
            "Review forensic report",
            "Validate access restriction",
            "Contact user for verification",
            "Escalate if confirmed breach",
        ],
    });
    (
        outputs,
        impact(0.0, 0.0, 45.0, "Incident ticket and CISO notification"),
    )
}

fn vendor_negotiation(inputs: &StateMap) -> (Value, ImpactRecord) {
    const ESCALATION_CAP: f64 = 5.0;
    const SPEND_PER_POINT: f64 = 10_000.0;

    let proposed = inputs.get_f64("PriceIncrease", 9.0);
    let counter = proposed.min(ESCALATION_CAP);
    let savings = (proposed - counter) * SPEND_PER_POINT;
    let outputs = json!({
        "VendorId": inputs.get_str("VendorId", "VENDOR-001"),
        "ProposedIncrease": proposed,
        "ContractEscalationCap": ESCALATION_CAP,
        "BenchmarkMedian": 4.2,
        "CounterProposal": counter,
        "Justification": format!(
            "Contract caps annual escalation at {ESCALATION_CAP}%. Counter-proposing {counter}%."
        ),
        "SavingsIfAccepted": savings,
    });
    (
        outputs,
        impact(savings, 0.0, 3.0 * 60.0, "Vendor negotiation from contract clauses"),
    )
}

fn procurement_comms(inputs: &StateMap) -> (Value, ImpactRecord) {
    let outputs = json!({
        "EmailSent": true,
        "Subject": "Re: Annual Pricing Review - Counter Proposal",
        "CounterProposalSent": inputs.get_f64("CounterProposal", 5.0),
        "EscalationReady": true,
        "AutoEscalateOnRejection": true,
    });
    (
        outputs,
        impact(0.0, 0.0, 60.0, "Counterproposal sent to vendor"),
    )
}

fn attrition_detection(inputs: &StateMap) -> (Value, ImpactRecord) {
    let outputs = json!({
        "TeamId": inputs.get_str("TeamId", "eng-platform"),
        "AttritionProbability": 0.68,
        "SentimentScore": 3.2,
        "SentimentTrend": "Declining (-1.4 over 90 days)",
        "CompVsMarket": "12% below median for Sr. Engineers",
        "AtRiskEmployees": 4,
        "TopFactors": [
            "Below-market compensation",
            "Manager sentiment drop",
            "Reduced PR activity",
        ],
    });
    (
        outputs,
        impact(25_000.0, 0.0, 5.0 * 60.0, "Early attrition detection"),
    )
}

fn retention_action(inputs: &StateMap) -> (Value, ImpactRecord) {
    const RETENTION_BUDGET: f64 = 96_000.0;
    const REPLACEMENT_COST: f64 = 720_000.0;

    let outputs = json!({
        "RetentionPackages": [
            { "Employee": "EMP-4021", "Package": "Equity refresh + title", "EstCost": 45_000.0 },
            { "Employee": "EMP-4033", "Package": "Spot bonus + lead role", "EstCost": 25_000.0 },
            { "Employee": "EMP-4047", "Package": "Comp to market median", "EstCost": 18_000.0 },
            { "Employee": "EMP-4052", "Package": "Learning budget", "EstCost": 8_000.0 },
        ],
        "ManagerCheckinsScheduled": inputs.get_i64("AtRiskEmployees", 0),
        "TotalRetentionBudget": RETENTION_BUDGET,
        "ProjectedSavingsVsReplacement": REPLACEMENT_COST - RETENTION_BUDGET,
    });
    (
        outputs,
        impact(
            REPLACEMENT_COST - RETENTION_BUDGET,
            0.0,
            10.0 * 60.0,
            "Retention packages in place of replacement hiring",
        ),
    )
}

fn impact(cost: f64, revenue: f64, minutes: f64, description: &str) -> ImpactRecord {
    let exact = |n: f64| Decimal::try_from(n).unwrap_or_default();
    ImpactRecord {
        cost_saved: exact(cost),
        revenue_influenced: exact(revenue),
        time_saved_minutes: exact(minutes),
        manual_steps_eliminated: 1,
        description: Some(description.to_string()),
    }
}

fn into_state(value: Value) -> StateMap {
    match value {
        Value::Object(map) => map.into_iter().collect(),
        _ => StateMap::new(),
    }
}

fn add_business_days(from: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    let mut date = from;
    let mut added = 0;
    while added < days {
        date += ChronoDuration::days(1);
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            added += 1;
        }
    }
    date
}
