//! Error views for failed boundaries.

use defer_data::UnitError;

/// What a boundary shows when its unit fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ErrorView {
    /// Render custom HTML.
    RenderHtml(String),

    /// Show the error message.
    #[default]
    ShowError,

    /// Leave the boundary empty.
    Skip,
}

impl ErrorView {
    /// Create a view that renders custom HTML.
    pub fn html(html: impl Into<String>) -> Self {
        Self::RenderHtml(html.into())
    }

    /// Create a view that shows a fixed user-friendly message.
    pub fn message(message: impl AsRef<str>) -> Self {
        Self::RenderHtml(format!(
            r#"<div class="boundary-error">{}</div>"#,
            escape_html(message.as_ref())
        ))
    }

    /// Render the view for an error. `None` means the boundary is skipped.
    pub fn render(&self, error: &UnitError) -> Option<String> {
        match self {
            Self::RenderHtml(html) => Some(html.clone()),
            Self::ShowError => Some(format!(
                r#"<div class="boundary-error">Failed to load {}: {}</div>"#,
                escape_html(error.unit()),
                escape_html(&error_detail(error))
            )),
            Self::Skip => None,
        }
    }
}

fn error_detail(error: &UnitError) -> String {
    match error {
        UnitError::ComputationFailure { message, .. } | UnitError::Panicked { message, .. } => {
            message.clone()
        }
        UnitError::Cancelled(_) => "cancelled".to_string(),
        UnitError::AlreadyStarted(_) => "already started".to_string(),
    }
}

/// Simple HTML escape for text and attribute values.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(message: &str) -> UnitError {
        UnitError::ComputationFailure {
            unit: "deferredStuff".to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_show_error_escapes_message() {
        let html = ErrorView::ShowError.render(&failure("<b>oops</b>")).unwrap();
        assert_eq!(
            html,
            r#"<div class="boundary-error">Failed to load deferredStuff: &lt;b&gt;oops&lt;/b&gt;</div>"#
        );
    }

    #[test]
    fn test_custom_and_skip() {
        let err = failure("down");
        assert_eq!(
            ErrorView::html("<p>later</p>").render(&err).as_deref(),
            Some("<p>later</p>")
        );
        assert_eq!(ErrorView::Skip.render(&err), None);
        assert_eq!(
            ErrorView::message("Try again").render(&err).as_deref(),
            Some(r#"<div class="boundary-error">Try again</div>"#)
        );
    }
}
