//! Flowgate Engine
//!
//! Executes workflow definitions step by step. Before each step the policy
//! engine decides whether the step may run; every decision and completion is
//! audited. The orchestrator turns events from the feed into workflow runs.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use flowgate_engine::{AgentRegistry, WorkflowEngine};
//! use tokio_util::sync::CancellationToken;
//!
//! let engine = WorkflowEngine::new(Arc::new(agents), policy_engine, audit_log);
//! let instance = engine.execute(&definition, Some(inputs), &CancellationToken::new()).await;
//! println!("{} -> {}", instance.instance_id, instance.status);
//! ```

pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod platform;
pub mod registry;

pub use error::{EngineError, PlatformError, RegistryError};
pub use executor::WorkflowEngine;
pub use orchestrator::{run_supervised, EventDrivenOrchestrator, OrchestratorError};
pub use platform::{Dashboard, Platform};
pub use registry::{AgentRegistry, WorkflowRegistry};
