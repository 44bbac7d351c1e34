//! System event type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::StateMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSeverity {
    #[default]
    Info,
    Warning,
    Anomaly,
    Critical,
}

/// Something that happened in an external system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemEvent {
    pub event_id: String,

    /// Emitting system, e.g. `crm` or `siem`
    pub source: String,

    /// Event type matched against workflow triggers
    pub event_type: String,

    pub department: String,
    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub payload: StateMap,

    #[serde(default)]
    pub severity: EventSeverity,
}

impl SystemEvent {
    /// Create an info event with an empty payload
    pub fn new(
        source: impl Into<String>,
        event_type: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            event_id: crate::new_id(),
            source: source.into(),
            event_type: event_type.into(),
            department: department.into(),
            timestamp: Utc::now(),
            payload: StateMap::new(),
            severity: EventSeverity::Info,
        }
    }

    pub fn with_payload(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    pub fn with_severity(mut self, severity: EventSeverity) -> Self {
        self.severity = severity;
        self
    }
}
