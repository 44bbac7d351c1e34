//! Event bus contract and the in-memory feed
//!
//! The in-memory bus is a single unbounded queue. Every subscriber reads from
//! the same receiver, so concurrent subscribers split the feed between them
//! rather than each seeing every event.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use tokio::sync::{mpsc, Mutex};

use super::SystemEvent;

/// Live, order-preserving stream of events
pub type EventStream = Pin<Box<dyn Stream<Item = SystemEvent> + Send>>;

/// Error from event bus operations
#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("event bus closed")]
    Closed,
}

/// Publish/subscribe event feed
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Enqueue an event without blocking
    async fn publish(&self, event: SystemEvent) -> Result<(), EventBusError>;

    /// Subscribe to the feed, optionally keeping only one department's events
    ///
    /// Events read by a filtered subscriber that do not match are consumed.
    fn subscribe(&self, department: Option<String>) -> EventStream;
}

/// Unbounded in-process event bus
#[derive(Clone)]
pub struct InMemoryEventBus {
    tx: mpsc::UnboundedSender<SystemEvent>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<SystemEvent>>>,
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
        }
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, event: SystemEvent) -> Result<(), EventBusError> {
        tracing::debug!(
            event_id = %event.event_id,
            event_type = %event.event_type,
            "Publishing event"
        );
        self.tx.send(event).map_err(|_| EventBusError::Closed)
    }

    fn subscribe(&self, department: Option<String>) -> EventStream {
        let rx = Arc::clone(&self.rx);
        futures::stream::unfold((rx, department), |(rx, department)| async move {
            loop {
                let event = rx.lock().await.recv().await?;
                let keep = department
                    .as_deref()
                    .map_or(true, |d| event.department.eq_ignore_ascii_case(d));
                if keep {
                    return Some((event, (rx, department)));
                }
            }
        })
        .boxed()
    }
}

impl std::fmt::Debug for InMemoryEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryEventBus").finish_non_exhaustive()
    }
}
