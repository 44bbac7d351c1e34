//! Agent identity and results

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::value::StateMap;

/// Risk tier of an agent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

/// Who an agent is and what it does
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentIdentity {
    pub agent_id: String,
    pub name: String,
    pub department: String,
    pub capabilities: Vec<String>,
    pub risk_tier: RiskTier,
    pub registered_at: DateTime<Utc>,
}

impl AgentIdentity {
    /// Create an identity with no capabilities and low risk
    pub fn new(
        agent_id: impl Into<String>,
        name: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            name: name.into(),
            department: department.into(),
            capabilities: Vec::new(),
            risk_tier: RiskTier::Low,
            registered_at: Utc::now(),
        }
    }

    /// Add a capability tag
    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    /// Set the risk tier
    pub fn with_risk_tier(mut self, risk_tier: RiskTier) -> Self {
        self.risk_tier = risk_tier;
        self
    }
}

/// Business value an agent attributes to its own run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactRecord {
    pub cost_saved: Decimal,
    pub revenue_influenced: Decimal,
    pub time_saved_minutes: Decimal,
    pub manual_steps_eliminated: u32,
    #[serde(default)]
    pub description: Option<String>,
}

/// Result of one agent invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    /// Whether the agent considers the step successful
    pub succeeded: bool,

    /// Outputs merged into shared state when the step succeeds
    pub outputs: StateMap,

    pub error: Option<String>,

    #[serde(with = "duration_millis")]
    pub duration: Duration,

    pub impact: Option<ImpactRecord>,
}

impl AgentResult {
    /// Successful result with outputs
    pub fn success(outputs: StateMap) -> Self {
        Self {
            succeeded: true,
            outputs,
            error: None,
            duration: Duration::ZERO,
            impact: None,
        }
    }

    /// Unsuccessful result with an error message
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            outputs: StateMap::new(),
            error: Some(error.into()),
            duration: Duration::ZERO,
            impact: None,
        }
    }

    /// Set the measured duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Attach an impact record
    pub fn with_impact(mut self, impact: ImpactRecord) -> Self {
        self.impact = Some(impact);
        self
    }
}

/// Fault raised by an agent
///
/// Unlike an unsuccessful [`AgentResult`], a fault is not recovered at the
/// step: it fails the whole workflow instance.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AgentError {
    /// The agent observed cancellation and stopped
    #[error("agent invocation cancelled")]
    Cancelled,

    /// Any other agent fault
    #[error("{0}")]
    Fault(String),
}

impl AgentError {
    /// Create a fault with a message
    pub fn fault(message: impl Into<String>) -> Self {
        Self::Fault(message.into())
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_constructors() {
        let mut outputs = StateMap::new();
        outputs.insert("Score".into(), json!(8.5));

        let ok = AgentResult::success(outputs).with_duration(Duration::from_millis(12));
        assert!(ok.succeeded);
        assert!(ok.error.is_none());
        assert_eq!(ok.outputs["Score"], json!(8.5));

        let failed = AgentResult::failure("upstream unavailable");
        assert!(!failed.succeeded);
        assert!(failed.outputs.is_empty());
        assert_eq!(failed.error.as_deref(), Some("upstream unavailable"));
    }

    #[test]
    fn test_identity_builder() {
        let identity = AgentIdentity::new("hr-retention", "Retention Agent", "HR")
            .with_capability("retention-offers")
            .with_risk_tier(RiskTier::High);

        assert_eq!(identity.capabilities, vec!["retention-offers"]);
        assert_eq!(identity.risk_tier, RiskTier::High);
        assert!(RiskTier::Critical > RiskTier::Medium);
    }

    #[test]
    fn test_duration_serializes_as_millis() {
        let result = AgentResult::success(StateMap::new()).with_duration(Duration::from_secs(2));
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["duration"], json!(2000));
    }
}
