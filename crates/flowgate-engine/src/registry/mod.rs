//! Lookup tables built once at startup
//!
//! Both registries are populated through `&mut self` and then shared
//! read-only behind an `Arc`.

mod agents;
mod workflows;

pub use agents::AgentRegistry;
pub use workflows::WorkflowRegistry;
