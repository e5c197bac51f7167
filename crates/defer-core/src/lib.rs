//! Core abstractions for deferred page loading.
//!
//! This crate provides the fundamental types shared by every layer:
//! - `NavigationContext` - Per-navigation identity, path and query
//! - `OrchestratorConfig` - Load orchestration settings
//! - `LifecyclePhase` - Navigation lifecycle tracking

mod config;
mod lifecycle;
mod navigation;

pub use config::*;
pub use lifecycle::*;
pub use navigation::*;
