//! Worker configuration

use std::time::Duration;

const DEFAULT_RESTART_DELAY_MS: u64 = 5000;

/// Worker settings read from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    /// Publish one trigger event per catalog workflow on startup
    pub demo_events: bool,

    /// Workflow to execute once through the platform facade
    pub run_workflow: Option<String>,

    /// Delay before restarting the orchestrator after a fault
    pub restart_delay: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            demo_events: false,
            run_workflow: None,
            restart_delay: Duration::from_millis(DEFAULT_RESTART_DELAY_MS),
        }
    }
}

impl WorkerConfig {
    /// Create configuration from environment variables
    ///
    /// - `FLOWGATE_DEMO_EVENTS`: `true`/`1`/`yes`/`on` enables demo events
    /// - `FLOWGATE_RUN_WORKFLOW`: workflow id to run once
    /// - `FLOWGATE_RESTART_DELAY_MS`: restart delay (default 5000)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let demo_events = lookup("FLOWGATE_DEMO_EVENTS")
            .map(|v| parse_flag(&v))
            .unwrap_or(defaults.demo_events);

        let run_workflow = lookup("FLOWGATE_RUN_WORKFLOW")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let restart_delay = lookup("FLOWGATE_RESTART_DELAY_MS")
            .and_then(|v| v.trim().parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.restart_delay);

        Self {
            demo_events,
            run_workflow,
            restart_delay,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
