//! In-memory impact tracker

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::{ImpactError, ImpactMetrics, ImpactSummary, ImpactTracker};

/// Impact tracker that keeps every record in memory
#[derive(Debug, Default)]
pub struct InMemoryImpactTracker {
    records: RwLock<Vec<ImpactMetrics>>,
}

impl InMemoryImpactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded metrics
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl ImpactTracker for InMemoryImpactTracker {
    async fn record(&self, metrics: ImpactMetrics) -> Result<(), ImpactError> {
        tracing::debug!(
            instance_id = %metrics.workflow_instance_id,
            department = %metrics.department,
            cost_saved = %metrics.cost_saved,
            "Recording impact"
        );
        self.records.write().push(metrics);
        Ok(())
    }

    async fn summary(
        &self,
        department: Option<&str>,
        since: Option<DateTime<Utc>>,
    ) -> Result<ImpactSummary, ImpactError> {
        let records = self.records.read();
        let mut summary = ImpactSummary::default();
        for metrics in records.iter() {
            if department.is_some_and(|d| !metrics.department.eq_ignore_ascii_case(d)) {
                continue;
            }
            if since.is_some_and(|s| metrics.timestamp < s) {
                continue;
            }
            summary.add(metrics);
        }
        Ok(summary)
    }
}
