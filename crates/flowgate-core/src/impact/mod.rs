//! Business impact tracking

mod memory;
mod metrics;

pub use memory::InMemoryImpactTracker;
pub use metrics::{DepartmentImpact, ImpactError, ImpactMetrics, ImpactSummary, ImpactTracker};
