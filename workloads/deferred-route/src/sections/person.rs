//! Person renderers.

use defer_sdk::defer_streaming::{escape_html, Boundary, BoundaryView, ErrorView};

use crate::data::{Person, RouteValue};

/// Fallback shown while the deferred person loads.
pub const PERSON_FALLBACK: &str = "<div>Loading person...</div>";

/// Render the eagerly loaded person.
pub fn render_regular_person(person: &Person) -> String {
    format!(
        r#"<div data-testid="regular-person">{} - {}</div>"#,
        escape_html(&person.name),
        person.resolve_at_iso()
    )
}

/// Render the deferred person.
pub fn render_deferred_person(person: &Person) -> String {
    format!(
        r#"<div data-testid="deferred-person">{} - {} - {}</div>"#,
        escape_html(&person.name),
        person.resolve_at_iso(),
        person.random_number
    )
}

/// Plain-text line for a person.
pub fn person_line(person: &Person) -> String {
    format!(
        "{} - {} - {}",
        person.name,
        person.resolve_at_iso(),
        person.random_number
    )
}

/// View for the deferred person boundary.
pub fn deferred_person_view(id: &str) -> impl BoundaryView<RouteValue> {
    Boundary::builder(id)
        .with_fallback(PERSON_FALLBACK)
        .with_error_view(ErrorView::ShowError)
        .build()
        .view(|value: &RouteValue| {
            value
                .as_person()
                .map(render_deferred_person)
                .unwrap_or_default()
        })
}
