//! Asynchronous units with observable execution state.
//!
//! This crate provides:
//! - `AsyncUnit` - A named computation started at most once
//! - `ExecutionState` - `Pending`, `Resolved` or `Failed`, one-way
//! - `PendingHandle` - Non-owning observation point into a unit
//! - `Subscription` - Guard that unsubscribes on drop

mod cell;
mod error;
mod handle;
mod state;
mod unit;

pub use error::*;
pub use handle::*;
pub use state::*;
pub use unit::*;
