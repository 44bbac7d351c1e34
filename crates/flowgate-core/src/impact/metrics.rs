//! Impact metrics and the tracker contract

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Quantified value attributed to one workflow instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactMetrics {
    pub workflow_instance_id: String,
    pub workflow_id: String,
    pub department: String,
    pub timestamp: DateTime<Utc>,
    pub cost_saved: Decimal,
    pub revenue_influenced: Decimal,
    pub time_saved_minutes: Decimal,
    pub manual_steps_eliminated: u32,
    pub risk_reduction_score: f64,

    #[serde(default)]
    pub custom_metrics: HashMap<String, f64>,
}

impl ImpactMetrics {
    /// Zeroed metrics for an instance
    pub fn new(
        workflow_instance_id: impl Into<String>,
        workflow_id: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            workflow_instance_id: workflow_instance_id.into(),
            workflow_id: workflow_id.into(),
            department: department.into(),
            timestamp: Utc::now(),
            cost_saved: Decimal::ZERO,
            revenue_influenced: Decimal::ZERO,
            time_saved_minutes: Decimal::ZERO,
            manual_steps_eliminated: 0,
            risk_reduction_score: 0.0,
            custom_metrics: HashMap::new(),
        }
    }

    pub fn with_cost_saved(mut self, cost_saved: Decimal) -> Self {
        self.cost_saved = cost_saved;
        self
    }

    pub fn with_revenue_influenced(mut self, revenue: Decimal) -> Self {
        self.revenue_influenced = revenue;
        self
    }

    pub fn with_time_saved_minutes(mut self, minutes: Decimal) -> Self {
        self.time_saved_minutes = minutes;
        self
    }

    pub fn with_manual_steps_eliminated(mut self, steps: u32) -> Self {
        self.manual_steps_eliminated = steps;
        self
    }
}

/// Per-department totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepartmentImpact {
    /// Lowercased department name
    pub department: String,
    pub cost_saved: Decimal,
    pub revenue_influenced: Decimal,
    pub time_saved_minutes: Decimal,
    pub workflows_executed: usize,
}

/// Aggregated impact over a set of metrics
///
/// Money and time are exact decimals, so the totals do not depend on the
/// order records were added in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactSummary {
    pub total_cost_saved: Decimal,
    pub total_revenue_influenced: Decimal,
    pub total_time_saved_minutes: Decimal,
    pub total_workflows_executed: usize,
    pub total_steps_automated: u64,

    /// Keyed by the lowercased department name
    pub by_department: BTreeMap<String, DepartmentImpact>,
}

impl ImpactSummary {
    /// Fold one metrics record into the totals
    pub fn add(&mut self, metrics: &ImpactMetrics) {
        self.total_cost_saved += metrics.cost_saved;
        self.total_revenue_influenced += metrics.revenue_influenced;
        self.total_time_saved_minutes += metrics.time_saved_minutes;
        self.total_workflows_executed += 1;
        self.total_steps_automated += u64::from(metrics.manual_steps_eliminated);

        let key = metrics.department.to_ascii_lowercase();
        let department = self
            .by_department
            .entry(key.clone())
            .or_insert_with(|| DepartmentImpact {
                department: key,
                ..DepartmentImpact::default()
            });
        department.cost_saved += metrics.cost_saved;
        department.revenue_influenced += metrics.revenue_influenced;
        department.time_saved_minutes += metrics.time_saved_minutes;
        department.workflows_executed += 1;
    }
}

/// Error from impact tracker operations
#[derive(Debug, thiserror::Error)]
pub enum ImpactError {
    #[error("impact store unavailable: {0}")]
    Unavailable(String),
}

/// Records and summarizes impact metrics
#[async_trait]
pub trait ImpactTracker: Send + Sync {
    async fn record(&self, metrics: ImpactMetrics) -> Result<(), ImpactError>;

    /// Totals over records matching `department` (case-insensitive) recorded at or after `since`
    async fn summary(
        &self,
        department: Option<&str>,
        since: Option<DateTime<Utc>>,
    ) -> Result<ImpactSummary, ImpactError>;
}
