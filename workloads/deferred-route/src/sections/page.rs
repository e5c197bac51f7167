//! Page frame: shell, heading, counter and error state.

use defer_sdk::defer_streaming::{escape_html, HeadContent, Shell};

/// Create the shell for the deferred route.
pub fn create_shell() -> Shell {
    let head = HeadContent::new("Deferred Route")
        .with_meta("viewport", "width=device-width, initial-scale=1")
        .with_style(PAGE_STYLES);

    Shell::new(head).with_body_start("<body>\n<main class=\"p-2\">\n<h2>Deferred Route</h2>\n")
}

/// Render the local counter, which works before any boundary settles.
pub fn render_counter() -> String {
    r#"<div>Count: <span id="count">0</span></div>
<div><button onclick="var c=document.getElementById('count');c.textContent=Number(c.textContent)+1">Increment</button></div>"#
        .to_string()
}

/// Render the page body when an eager lookup failed.
pub fn render_route_error(message: &str) -> String {
    format!(
        r#"<div class="route-error" role="alert">
    <h3>Something went wrong</h3>
    <p>{}</p>
</div>"#,
        escape_html(message)
    )
}

const PAGE_STYLES: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; }
.p-2 { padding: 0.5rem; }
[data-state="fallback"] { color: #64748b; }
.boundary-error, .route-error { color: #ef4444; }
"#;
