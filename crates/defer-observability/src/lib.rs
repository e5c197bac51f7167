//! Logging setup and load metrics for deferred page loading.
//!
//! This crate provides:
//! - `init_logging` - Installs the `tracing` subscriber (human or JSON)
//! - `LoggingConfig` - Level, format and filter settings
//! - `LoadMetricsCollector` - Time-to-ready and per-boundary settle times

mod logging;
mod metrics;

pub use logging::*;
pub use metrics::*;

// Re-export for convenience
pub use defer_core::{NavigationId, TimingContext};
