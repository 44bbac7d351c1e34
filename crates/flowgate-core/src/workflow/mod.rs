//! Workflow definitions and execution records
//!
//! A [`WorkflowDefinition`] is an immutable, ordered list of steps. Each run
//! produces a fresh [`WorkflowInstance`] holding the shared state and one
//! [`StepExecution`] per visited step.

mod definition;
mod instance;

pub use definition::{StepDefinition, WorkflowDefinition};
pub use instance::{StepExecution, StepStatus, WorkflowInstance, WorkflowStatus};
