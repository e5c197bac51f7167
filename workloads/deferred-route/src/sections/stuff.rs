//! Deferred message renderer.

use defer_sdk::defer_streaming::{escape_html, Boundary, BoundaryView, ErrorView};

use crate::data::RouteValue;

/// Fallback shown while the message loads.
pub const STUFF_FALLBACK: &str = "<div>Loading stuff...</div>";

/// Render the deferred message.
pub fn render_stuff(message: &str) -> String {
    format!(
        r#"<h3 data-testid="deferred-stuff">{}</h3>"#,
        escape_html(message)
    )
}

/// View for the deferred message boundary.
pub fn deferred_stuff_view(id: &str) -> impl BoundaryView<RouteValue> {
    Boundary::builder(id)
        .with_fallback(STUFF_FALLBACK)
        .with_error_view(ErrorView::ShowError)
        .build()
        .view(|value: &RouteValue| value.as_message().map(render_stuff).unwrap_or_default())
}
