//! System events and the event feed

mod bus;
mod event;

pub use bus::{EventBus, EventBusError, EventStream, InMemoryEventBus};
pub use event::{EventSeverity, SystemEvent};
