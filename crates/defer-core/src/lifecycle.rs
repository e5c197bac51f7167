//! Navigation lifecycle tracking.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Lifecycle phases for a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Navigation started, units kicked off.
    Start,
    /// All eager units resolved; the page can be shown.
    Ready,
    /// A deferred boundary reached its terminal state.
    BoundarySettled(String),
    /// Every boundary settled.
    Completion,
    /// The navigation failed.
    Error(String),
}

/// Timing context for observability.
#[derive(Debug, Clone)]
pub struct TimingContext {
    start: Instant,
    marks: HashMap<String, Instant>,
}

impl TimingContext {
    /// Create a new timing context.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            marks: HashMap::new(),
        }
    }

    /// Record a timing mark.
    pub fn mark(&mut self, name: &str) {
        self.marks.insert(name.to_string(), Instant::now());
    }

    /// Mark the page as ready (eager units resolved).
    pub fn mark_ready(&mut self) {
        self.mark("ready");
    }

    /// Mark a boundary as settled.
    pub fn mark_boundary_settled(&mut self, boundary: &str) {
        self.mark(&format!("boundary_{}_settled", boundary));
    }

    /// Get elapsed time since start.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time from navigation start until the page became ready.
    pub fn time_to_ready(&self) -> Option<Duration> {
        self.marks
            .get("ready")
            .map(|t| t.duration_since(self.start))
    }

    /// Time from navigation start until a boundary settled.
    pub fn boundary_settled(&self, boundary: &str) -> Option<Duration> {
        self.marks
            .get(&format!("boundary_{}_settled", boundary))
            .map(|t| t.duration_since(self.start))
    }

    /// Time until the first boundary settled.
    pub fn time_to_first_boundary(&self) -> Option<Duration> {
        self.marks
            .iter()
            .filter(|(k, _)| k.starts_with("boundary_") && k.ends_with("_settled"))
            .map(|(_, t)| t.duration_since(self.start))
            .min()
    }
}

impl Default for TimingContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer trait for lifecycle events.
pub trait LifecycleObserver: Send + Sync {
    /// Called when a lifecycle phase occurs.
    fn on_phase(&self, phase: LifecyclePhase, elapsed: Duration);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marks_are_relative_to_start() {
        let mut timing = TimingContext::new();
        assert!(timing.time_to_ready().is_none());
        assert!(timing.time_to_first_boundary().is_none());

        timing.mark_ready();
        timing.mark_boundary_settled("deferredPerson");

        assert!(timing.time_to_ready().is_some());
        assert!(timing.boundary_settled("deferredPerson").is_some());
        assert!(timing.boundary_settled("deferredStuff").is_none());
        assert_eq!(
            timing.time_to_first_boundary(),
            timing.boundary_settled("deferredPerson")
        );
    }
}
