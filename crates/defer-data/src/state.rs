//! Execution state of a unit.

use crate::error::UnitError;

/// Current state of an asynchronous unit.
///
/// Transitions are one-way: `Pending -> Resolved` or `Pending -> Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionState<T> {
    /// Still computing (or not started yet).
    Pending,
    /// Finished with a value.
    Resolved(T),
    /// Finished with an error.
    Failed(UnitError),
}

impl<T> ExecutionState<T> {
    /// Check if the unit has not reached a terminal state.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Check if the unit has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }

    /// The resolved value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Resolved(value) => Some(value),
            _ => None,
        }
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&UnitError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Convert a terminal state into a `Result`; `None` while pending.
    pub fn into_result(self) -> Option<Result<T, UnitError>> {
        match self {
            Self::Pending => None,
            Self::Resolved(value) => Some(Ok(value)),
            Self::Failed(error) => Some(Err(error)),
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved(_) => "resolved",
            Self::Failed(_) => "failed",
        }
    }
}
