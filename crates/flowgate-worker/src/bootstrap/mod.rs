//! Demo catalog
//!
//! Simulated agents for six departments, one workflow per department and the
//! governance policies over them, wired into an in-memory [`Platform`].

mod agents;
mod policies;
mod workflows;

use std::sync::Arc;

use flowgate_core::{InMemoryEventBus, InMemoryImpactTracker};
use flowgate_engine::Platform;
use flowgate_governance::InMemoryAuditLog;

pub use agents::{agent_registry, SimulatedAgent};
pub use policies::policy_engine;
pub use workflows::{demo_events, workflow_registry};

/// Platform with the demo catalog and in-memory backends
pub fn platform() -> Platform {
    Platform::new(
        Arc::new(agent_registry()),
        Arc::new(workflow_registry()),
        Arc::new(policy_engine()),
        Arc::new(InMemoryAuditLog::new()),
        Arc::new(InMemoryImpactTracker::new()),
        Arc::new(InMemoryEventBus::new()),
    )
}
