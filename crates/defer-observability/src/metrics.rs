//! Load timing metrics.

use std::time::{Duration, Instant};

use defer_core::NavigationId;
use serde::{Deserialize, Serialize};

/// How a boundary ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryOutcome {
    Resolved,
    Error,
}

/// Metrics for one deferred boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryMetrics {
    /// Boundary id.
    pub id: String,
    /// Time from navigation start to the terminal state (microseconds).
    pub settled_us: u64,
    /// Terminal outcome.
    pub outcome: BoundaryOutcome,
}

/// Metrics for one navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadMetrics {
    /// Navigation id for correlation.
    pub navigation_id: String,
    /// Route path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    /// Number of eager units.
    pub eager_units: usize,
    /// Time until eager units resolved (microseconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_ready_us: Option<u64>,
    /// Time until the first boundary settled (microseconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_first_boundary_us: Option<u64>,
    /// Boundaries in the order they settled.
    pub boundaries: Vec<BoundaryMetrics>,
    /// Total navigation duration (microseconds).
    pub total_duration_us: u64,
}

/// Collector for navigation metrics.
///
/// Durations are passed in by the caller, measured from the navigation
/// start on whatever clock the caller runs on.
#[derive(Debug)]
pub struct LoadMetricsCollector {
    navigation_id: NavigationId,
    route: Option<String>,
    start: Instant,
    eager_units: usize,
    ready: Option<Duration>,
    boundaries: Vec<BoundaryMetrics>,
}

impl LoadMetricsCollector {
    /// Create a new collector.
    pub fn new(navigation_id: NavigationId) -> Self {
        Self {
            navigation_id,
            route: None,
            start: Instant::now(),
            eager_units: 0,
            ready: None,
            boundaries: Vec::new(),
        }
    }

    /// Set route path.
    pub fn set_route(&mut self, route: impl Into<String>) {
        self.route = Some(route.into());
    }

    /// Record that eager units resolved.
    pub fn record_ready(&mut self, eager_units: usize, after: Duration) {
        self.eager_units = eager_units;
        self.ready = Some(after);
    }

    /// Record a boundary reaching its terminal state.
    pub fn record_boundary(&mut self, id: &str, outcome: BoundaryOutcome, after: Duration) {
        self.boundaries.push(BoundaryMetrics {
            id: id.to_string(),
            settled_us: after.as_micros() as u64,
            outcome,
        });
    }

    /// Time until ready so far.
    pub fn time_to_ready(&self) -> Option<Duration> {
        self.ready
    }

    /// Wall-clock time since the collector was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Finalize and return the metrics.
    pub fn finalize(self) -> LoadMetrics {
        let time_to_first_boundary_us = self.boundaries.iter().map(|b| b.settled_us).min();
        let last_boundary = self.boundaries.iter().map(|b| b.settled_us).max();
        let elapsed = self.start.elapsed().as_micros() as u64;

        LoadMetrics {
            navigation_id: self.navigation_id.to_string(),
            route: self.route,
            eager_units: self.eager_units,
            time_to_ready_us: self.ready.map(|d| d.as_micros() as u64),
            time_to_first_boundary_us,
            boundaries: self.boundaries,
            total_duration_us: last_boundary.map_or(elapsed, |last| last.max(elapsed)),
        }
    }
}

fn ms(us: u64) -> f64 {
    us as f64 / 1000.0
}

impl LoadMetrics {
    /// Format as JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Format as JSON (pretty printed).
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Number of boundaries that ended in an error.
    pub fn failed_boundaries(&self) -> usize {
        self.boundaries
            .iter()
            .filter(|b| b.outcome == BoundaryOutcome::Error)
            .count()
    }

    /// Format as human-readable summary.
    pub fn to_summary(&self) -> String {
        let mut lines = vec![format!("Navigation: {}", self.navigation_id)];

        if let Some(route) = &self.route {
            lines.push(format!("  Route: {}", route));
        }
        if let Some(ready) = self.time_to_ready_us {
            lines.push(format!(
                "  Time to ready: {:.2}ms ({} eager)",
                ms(ready),
                self.eager_units
            ));
        }
        if let Some(first) = self.time_to_first_boundary_us {
            lines.push(format!("  Time to first boundary: {:.2}ms", ms(first)));
        }
        if !self.boundaries.is_empty() {
            lines.push("  Boundaries:".to_string());
            for boundary in &self.boundaries {
                let marker = match boundary.outcome {
                    BoundaryOutcome::Resolved => "",
                    BoundaryOutcome::Error => " [error]",
                };
                lines.push(format!(
                    "    {}: {:.2}ms{}",
                    boundary.id,
                    ms(boundary.settled_us),
                    marker
                ));
            }
        }
        lines.push(format!("  Total: {:.2}ms", ms(self.total_duration_us)));

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_boundaries_in_settle_order() {
        let mut collector = LoadMetricsCollector::new(NavigationId(7));
        collector.set_route("/deferred");
        collector.record_ready(1, Duration::from_millis(2));
        collector.record_boundary("deferredPerson", BoundaryOutcome::Resolved, Duration::from_millis(1000));
        collector.record_boundary("deferredStuff", BoundaryOutcome::Error, Duration::from_millis(2000));

        let metrics = collector.finalize();
        assert_eq!(metrics.navigation_id, "nav-000007");
        assert_eq!(metrics.time_to_ready_us, Some(2_000));
        assert_eq!(metrics.time_to_first_boundary_us, Some(1_000_000));
        assert_eq!(metrics.total_duration_us, 2_000_000);
        assert_eq!(metrics.failed_boundaries(), 1);

        let summary = metrics.to_summary();
        assert!(summary.contains("Route: /deferred"));
        assert!(summary.contains("deferredStuff: 2000.00ms [error]"));

        let json: serde_json::Value = serde_json::from_str(&metrics.to_json()).unwrap();
        assert_eq!(json["boundaries"][0]["outcome"], "resolved");
    }
}
