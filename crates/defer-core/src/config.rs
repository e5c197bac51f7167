//! Load orchestration configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for a `LoadOrchestrator`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Upper bound on how long `run` waits for eager units (milliseconds).
    ///
    /// `None` waits indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eager_deadline_ms: Option<u64>,

    /// Settle still-pending units as cancelled and abort their tasks when
    /// a navigation is superseded.
    ///
    /// When false, superseded units run to completion unobserved.
    #[serde(default)]
    pub abort_on_supersede: bool,
}

impl OrchestratorConfig {
    /// Create a configuration with no deadline and detach-only supersession.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the eager deadline.
    pub fn with_eager_deadline(mut self, deadline: Duration) -> Self {
        self.eager_deadline_ms = Some(deadline.as_millis() as u64);
        self
    }

    /// Abort pending units of superseded navigations.
    pub fn with_abort_on_supersede(mut self, abort: bool) -> Self {
        self.abort_on_supersede = abort;
        self
    }

    /// The eager deadline as a `Duration`.
    pub fn eager_deadline(&self) -> Option<Duration> {
        self.eager_deadline_ms.map(Duration::from_millis)
    }
}
