//! Workflow registry

use std::collections::HashMap;
use std::sync::Arc;

use flowgate_core::WorkflowDefinition;

use crate::error::RegistryError;

/// Maps workflow ids and trigger event types to definitions
///
/// Ids and trigger types are matched case-insensitively. When several
/// definitions share a trigger, the one registered first is returned.
#[derive(Debug, Default)]
pub struct WorkflowRegistry {
    workflows: Vec<Arc<WorkflowDefinition>>,
    by_id: HashMap<String, usize>,
    by_trigger: HashMap<String, usize>,
}

impl WorkflowRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition
    ///
    /// Registering an id again replaces the earlier definition in place.
    pub fn register(&mut self, definition: WorkflowDefinition) {
        let key = definition.id.to_lowercase();
        let definition = Arc::new(definition);
        match self.by_id.get(&key) {
            Some(&slot) => self.workflows[slot] = definition,
            None => {
                self.by_id.insert(key, self.workflows.len());
                self.workflows.push(definition);
            }
        }
        self.reindex_triggers();
    }

    fn reindex_triggers(&mut self) {
        self.by_trigger.clear();
        for (slot, definition) in self.workflows.iter().enumerate() {
            if let Some(trigger) = &definition.trigger_event_type {
                self.by_trigger.entry(trigger.to_lowercase()).or_insert(slot);
            }
        }
    }

    /// Look up a definition by id
    pub fn resolve(&self, workflow_id: &str) -> Result<Arc<WorkflowDefinition>, RegistryError> {
        self.by_id
            .get(&workflow_id.to_lowercase())
            .map(|&slot| Arc::clone(&self.workflows[slot]))
            .ok_or_else(|| RegistryError::WorkflowNotRegistered(workflow_id.to_string()))
    }

    /// First-registered definition triggered by `event_type`
    pub fn find_by_trigger(&self, event_type: &str) -> Option<Arc<WorkflowDefinition>> {
        self.by_trigger
            .get(&event_type.to_lowercase())
            .map(|&slot| Arc::clone(&self.workflows[slot]))
    }

    /// All definitions in registration order
    pub fn list(&self) -> Vec<Arc<WorkflowDefinition>> {
        self.workflows.clone()
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }
}
