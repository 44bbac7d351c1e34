// Flowgate Worker
//
// Process host for the platform: reads configuration from the environment,
// builds the demo catalog and keeps the event-driven orchestrator running.

pub mod bootstrap;
pub mod config;

pub use config::WorkerConfig;
