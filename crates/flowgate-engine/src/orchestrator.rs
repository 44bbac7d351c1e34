//! Event-driven orchestration
//!
//! The orchestrator consumes the whole event feed. Each event whose type
//! triggers a registered workflow starts an independent, unawaited run.
//! There is no bound on how many runs may be in flight at once.

use std::sync::Arc;
use std::time::Duration;

use flowgate_core::{EventBus, StateMap, SystemEvent, WorkflowInstance};
use futures::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::executor::WorkflowEngine;
use crate::registry::WorkflowRegistry;

/// Errors that stop the orchestrator loop
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// The event feed ended while the orchestrator was still running
    #[error("event feed closed")]
    FeedClosed,
}

/// Starts workflows from events on the feed
#[derive(Clone)]
pub struct EventDrivenOrchestrator {
    event_bus: Arc<dyn EventBus>,
    workflows: Arc<WorkflowRegistry>,
    engine: Arc<WorkflowEngine>,
}

impl EventDrivenOrchestrator {
    pub fn new(
        event_bus: Arc<dyn EventBus>,
        workflows: Arc<WorkflowRegistry>,
        engine: Arc<WorkflowEngine>,
    ) -> Self {
        Self {
            event_bus,
            workflows,
            engine,
        }
    }

    /// Consume events until `cancel` fires
    ///
    /// Spawned runs share `cancel`, so cancelling it also cancels them.
    #[instrument(skip(self, cancel))]
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), OrchestratorError> {
        info!("Event-driven orchestrator started, listening for system events");
        let mut events = self.event_bus.subscribe(None);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Event-driven orchestrator stopping");
                    return Ok(());
                }
                next = events.next() => match next {
                    Some(event) => {
                        self.dispatch(event, &cancel);
                    }
                    None => return Err(OrchestratorError::FeedClosed),
                },
            }
        }
    }

    /// Start the workflow triggered by `event`, if any
    ///
    /// The returned handle resolves to the finished instance, or `None` when
    /// the run panicked. Callers are free to drop it.
    pub fn dispatch(
        &self,
        event: SystemEvent,
        cancel: &CancellationToken,
    ) -> Option<JoinHandle<Option<WorkflowInstance>>> {
        info!(
            event_id = %event.event_id,
            event_type = %event.event_type,
            source = %event.source,
            "Received event"
        );

        let Some(workflow) = self.workflows.find_by_trigger(&event.event_type) else {
            debug!(event_type = %event.event_type, "No workflow registered for event type");
            return None;
        };

        info!(
            workflow_id = %workflow.id,
            event_type = %event.event_type,
            "Triggering workflow"
        );

        let inputs = event_inputs(&event);
        let engine = Arc::clone(&self.engine);
        let run_cancel = cancel.clone();
        let run_workflow = Arc::clone(&workflow);
        let run = tokio::spawn(async move {
            engine
                .execute(&run_workflow, Some(inputs), &run_cancel)
                .await
        });

        let event_id = event.event_id;
        Some(tokio::spawn(async move {
            match run.await {
                Ok(instance) => Some(instance),
                Err(e) => {
                    error!(
                        workflow_id = %workflow.id,
                        event_id = %event_id,
                        error = %e,
                        "Failed to execute workflow for event"
                    );
                    None
                }
            }
        }))
    }
}

impl std::fmt::Debug for EventDrivenOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDrivenOrchestrator")
            .field("workflows", &self.workflows.len())
            .finish_non_exhaustive()
    }
}

/// Step-zero inputs for a triggered run: the payload plus event identity keys
pub fn event_inputs(event: &SystemEvent) -> StateMap {
    let mut inputs = event.payload.clone();
    inputs.insert("_eventId".to_string(), Value::String(event.event_id.clone()));
    inputs.insert("_eventSource".to_string(), Value::String(event.source.clone()));
    inputs.insert(
        "_eventTimestamp".to_string(),
        Value::String(event.timestamp.to_rfc3339()),
    );
    inputs
}

/// Run the orchestrator, restarting it after `restart_delay` whenever it stops
/// with an error, until `cancel` fires
pub async fn run_supervised(
    orchestrator: EventDrivenOrchestrator,
    cancel: CancellationToken,
    restart_delay: Duration,
) {
    info!("Orchestrator supervisor starting");

    while !cancel.is_cancelled() {
        if let Err(e) = orchestrator.run(cancel.clone()).await {
            error!(
                error = %e,
                delay_ms = restart_delay.as_millis() as u64,
                "Orchestrator stopped unexpectedly, restarting"
            );
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(restart_delay) => {}
            }
        }
    }

    info!("Orchestrator supervisor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_inputs() {
        let event = SystemEvent::new("crm", "sales.opportunity.stalled", "Sales")
            .with_payload("OpportunityId", "OPP-1")
            .with_payload("_eventSource", "spoofed");

        let inputs = event_inputs(&event);

        assert_eq!(inputs["OpportunityId"], json!("OPP-1"));
        assert_eq!(inputs["_eventId"], json!(event.event_id));
        assert_eq!(inputs["_eventSource"], json!("crm"));
        assert_eq!(inputs["_eventTimestamp"], json!(event.timestamp.to_rfc3339()));
        assert_eq!(inputs.len(), 4);
    }
}
