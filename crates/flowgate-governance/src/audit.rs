//! In-memory audit log

use async_trait::async_trait;
use flowgate_core::{AuditEntry, AuditError, AuditLog, AuditQuery};
use parking_lot::RwLock;

/// Append-only audit log held in memory
///
/// Entries are never mutated or removed once recorded.
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    entries: RwLock<Vec<AuditEntry>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every entry in recording order
    pub fn all(&self) -> Vec<AuditEntry> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        tracing::debug!(
            instance_id = %entry.workflow_instance_id,
            step_id = %entry.step_id,
            action = %entry.action,
            outcome = ?entry.outcome,
            "Audit entry recorded"
        );
        self.entries.write().push(entry);
        Ok(())
    }

    async fn query(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>, AuditError> {
        let mut matched: Vec<AuditEntry> = self
            .entries
            .read()
            .iter()
            .rev()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        // Stable: entries sharing a timestamp stay most-recently-recorded first
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matched.truncate(query.limit);
        Ok(matched)
    }
}
