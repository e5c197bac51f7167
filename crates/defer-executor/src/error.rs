//! Plan and load errors.

use std::time::Duration;

use defer_core::NavigationId;
use defer_data::UnitError;

/// Error building a load plan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("Duplicate unit id: {0}")]
    DuplicateUnit(String),

    #[error("Unit id must not be empty")]
    EmptyId,
}

/// Error running a navigation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("Eager unit '{unit}' failed: {source}")]
    Eager {
        unit: String,
        #[source]
        source: UnitError,
    },

    #[error("Eager units did not resolve within {0:?}")]
    DeadlineExceeded(Duration),

    #[error("Navigation {0} was superseded")]
    Superseded(NavigationId),

    #[error("Unit error: {0}")]
    Unit(#[from] UnitError),

    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),
}

impl LoadError {
    /// Superseded navigations are expected and not shown to users.
    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded(_))
    }
}
