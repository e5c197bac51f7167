//! Unit error taxonomy.

/// Error carried by a failed unit.
///
/// Errors are plain data so that every observer of a unit can receive its
/// own copy of the terminal state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitError {
    #[error("Unit '{unit}' failed: {message}")]
    ComputationFailure { unit: String, message: String },

    #[error("Unit '{unit}' panicked: {message}")]
    Panicked { unit: String, message: String },

    #[error("Unit '{0}' was already started")]
    AlreadyStarted(String),

    #[error("Unit '{0}' was cancelled")]
    Cancelled(String),
}

impl UnitError {
    /// Id of the unit this error belongs to.
    pub fn unit(&self) -> &str {
        match self {
            Self::ComputationFailure { unit, .. } | Self::Panicked { unit, .. } => unit,
            Self::AlreadyStarted(unit) | Self::Cancelled(unit) => unit,
        }
    }

    /// Whether the unit's own logic failed (as opposed to misuse or cancellation).
    pub fn is_computation_failure(&self) -> bool {
        matches!(self, Self::ComputationFailure { .. } | Self::Panicked { .. })
    }

    /// Cancellation is informational and never shown to users as an error.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}
