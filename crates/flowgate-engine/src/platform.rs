//! Platform facade
//!
//! The inbound surface an external request layer calls into. Operations are
//! thin pass-throughs to the registries, the engine and the collaborators;
//! the one addition is recording impact after a triggered run.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use flowgate_core::value::as_decimal;
use flowgate_core::{
    AgentIdentity, AuditEntry, AuditLog, AuditOutcome, AuditQuery, EventBus, ImpactMetrics,
    ImpactSummary, ImpactTracker, PolicyDecision, PolicyEngine, PolicyEvaluationContext,
    StateMap, StepStatus, SystemEvent, WorkflowDefinition, WorkflowInstance,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::error::PlatformError;
use crate::executor::WorkflowEngine;
use crate::orchestrator::EventDrivenOrchestrator;
use crate::registry::{AgentRegistry, WorkflowRegistry};

/// Hourly rate used to price time saved
pub const HOURLY_RATE: Decimal = Decimal::from_parts(150, 0, 0, false, 0);

/// Audit entries scanned when building the dashboard
const DASHBOARD_AUDIT_LIMIT: usize = 10_000;

/// Output keys summed into impact metrics
const COST_SAVED_KEY: &str = "CostSaved";
const REVENUE_KEY: &str = "RevisedAmount";
const TIME_SAVED_KEY: &str = "TimeSavedMinutes";

/// Impact and governance overview
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub summary: ImpactSummary,

    /// Automated steps per executed workflow
    pub automation_rate: f64,

    pub total_audit_entries: usize,
    pub policy_denials: usize,
    pub human_escalations: usize,
    pub departments: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Inbound facade over a fully wired platform
#[derive(Clone)]
pub struct Platform {
    agents: Arc<AgentRegistry>,
    workflows: Arc<WorkflowRegistry>,
    engine: Arc<WorkflowEngine>,
    policy_engine: Arc<dyn PolicyEngine>,
    audit_log: Arc<dyn AuditLog>,
    impact_tracker: Arc<dyn ImpactTracker>,
    event_bus: Arc<dyn EventBus>,
}

impl Platform {
    pub fn new(
        agents: Arc<AgentRegistry>,
        workflows: Arc<WorkflowRegistry>,
        policy_engine: Arc<dyn PolicyEngine>,
        audit_log: Arc<dyn AuditLog>,
        impact_tracker: Arc<dyn ImpactTracker>,
        event_bus: Arc<dyn EventBus>,
    ) -> Self {
        let engine = Arc::new(WorkflowEngine::new(
            Arc::clone(&agents),
            Arc::clone(&policy_engine),
            Arc::clone(&audit_log),
        ));
        Self {
            agents,
            workflows,
            engine,
            policy_engine,
            audit_log,
            impact_tracker,
            event_bus,
        }
    }

    pub fn engine(&self) -> Arc<WorkflowEngine> {
        Arc::clone(&self.engine)
    }

    /// Orchestrator wired to this platform's feed, registry and engine
    pub fn orchestrator(&self) -> EventDrivenOrchestrator {
        EventDrivenOrchestrator::new(
            Arc::clone(&self.event_bus),
            Arc::clone(&self.workflows),
            Arc::clone(&self.engine),
        )
    }

    /// Execute a workflow by id and record its impact
    ///
    /// The definition's default inputs are applied first and `inputs`
    /// override them. Returns the instance whatever its final status; only
    /// an unknown workflow id is an error.
    #[instrument(skip(self, inputs, cancel))]
    pub async fn trigger_workflow(
        &self,
        workflow_id: &str,
        inputs: StateMap,
        cancel: &CancellationToken,
    ) -> Result<WorkflowInstance, PlatformError> {
        let workflow = self.workflows.resolve(workflow_id)?;

        let mut merged = workflow.default_inputs.clone();
        merged.extend(inputs);

        let instance = self.engine.execute(&workflow, Some(merged), cancel).await;

        let metrics = impact_from_instance(&workflow, &instance);
        info!(
            instance_id = %instance.instance_id,
            cost_saved = %metrics.cost_saved,
            "Recording workflow impact"
        );
        self.impact_tracker.record(metrics).await?;

        Ok(instance)
    }

    pub async fn publish_event(&self, event: SystemEvent) -> Result<(), PlatformError> {
        Ok(self.event_bus.publish(event).await?)
    }

    pub async fn query_audit(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>, PlatformError> {
        Ok(self.audit_log.query(query).await?)
    }

    pub async fn impact_summary(
        &self,
        department: Option<&str>,
        since: Option<DateTime<Utc>>,
    ) -> Result<ImpactSummary, PlatformError> {
        Ok(self.impact_tracker.summary(department, since).await?)
    }

    /// Impact totals alongside audit outcome counts
    pub async fn dashboard(&self) -> Result<Dashboard, PlatformError> {
        let summary = self.impact_tracker.summary(None, None).await?;
        let entries = self
            .audit_log
            .query(&AuditQuery::default().with_limit(DASHBOARD_AUDIT_LIMIT))
            .await?;

        let count = |outcome: AuditOutcome| entries.iter().filter(|e| e.outcome == outcome).count();
        let automation_rate = if summary.total_workflows_executed > 0 {
            summary.total_steps_automated as f64 / summary.total_workflows_executed as f64
        } else {
            0.0
        };

        Ok(Dashboard {
            automation_rate,
            total_audit_entries: entries.len(),
            policy_denials: count(AuditOutcome::Denied),
            human_escalations: count(AuditOutcome::EscalatedToHuman),
            departments: summary.by_department.keys().cloned().collect(),
            summary,
            timestamp: Utc::now(),
        })
    }

    /// Evaluate a policy context outside any workflow
    pub async fn evaluate_policy(
        &self,
        context: &PolicyEvaluationContext,
    ) -> Result<PolicyDecision, PlatformError> {
        Ok(self.policy_engine.evaluate(context).await?)
    }

    pub fn list_agents(&self) -> Vec<AgentIdentity> {
        self.agents.list()
    }

    pub fn list_workflows(&self) -> Vec<Arc<WorkflowDefinition>> {
        self.workflows.list()
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("agents", &self.agents.len())
            .field("workflows", &self.workflows.len())
            .finish_non_exhaustive()
    }
}

/// Derive impact metrics from a finished instance
///
/// A step's own impact record is used when the agent supplied one; otherwise
/// its numeric `CostSaved`, `RevisedAmount` and `TimeSavedMinutes` outputs
/// are summed. Time saved is also priced at [`HOURLY_RATE`].
pub fn impact_from_instance(
    workflow: &WorkflowDefinition,
    instance: &WorkflowInstance,
) -> ImpactMetrics {
    let mut cost = Decimal::ZERO;
    let mut revenue = Decimal::ZERO;
    let mut minutes = Decimal::ZERO;

    for step in &instance.step_executions {
        match &step.impact {
            Some(impact) => {
                cost += impact.cost_saved;
                revenue += impact.revenue_influenced;
                minutes += impact.time_saved_minutes;
            }
            None => {
                let number =
                    |key: &str| step.outputs.get(key).and_then(as_decimal).unwrap_or_default();
                cost += number(COST_SAVED_KEY);
                revenue += number(REVENUE_KEY);
                minutes += number(TIME_SAVED_KEY);
            }
        }
    }

    let completed = instance
        .step_executions
        .iter()
        .filter(|s| s.status == StepStatus::Completed)
        .count();

    ImpactMetrics::new(&instance.instance_id, &workflow.id, &workflow.department)
        .with_cost_saved(cost + minutes * HOURLY_RATE / Decimal::from(60))
        .with_revenue_influenced(revenue)
        .with_time_saved_minutes(minutes)
        .with_manual_steps_eliminated(completed as u32)
}
