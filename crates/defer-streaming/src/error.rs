//! Rendering errors.

/// Error raised while mounting boundaries or streaming output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("Shell must be sent before any other output")]
    ShellNotSent,

    #[error("Shell already sent")]
    ShellAlreadySent,

    #[error("Stream already completed")]
    Completed,

    #[error("Boundary '{0}' is already mounted")]
    AlreadyMounted(String),

    #[error("Stream error: {0}")]
    Stream(String),
}
