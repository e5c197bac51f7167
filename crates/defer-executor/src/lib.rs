//! Load plans and the orchestrator that runs them.
//!
//! This crate turns a navigation into concurrent work:
//! - `LoadPlan` - Eager and deferred units declared for one navigation
//! - `LoadOrchestrator` - Starts every unit, waits only for eager ones
//! - `LoadResult` - Ready values plus pending handles, in declaration order

mod error;
mod orchestrator;
mod plan;
mod result;

pub use error::*;
pub use orchestrator::*;
pub use plan::*;
pub use result::*;
