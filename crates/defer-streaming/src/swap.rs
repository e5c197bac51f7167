//! Out-of-order boundary replacement.
//!
//! Boundaries settle in whatever order their units finish. Each boundary
//! is written as a placeholder first; a later resolution frame carries the
//! final markup in a `<template>` and a call that swaps it into place.

use crate::fallback::escape_html;

/// Name of the browser-side swap function.
pub const SWAP_FUNCTION: &str = "__deferSwap";

/// JavaScript defining the swap function. Emitted once, in the shell.
pub fn swap_script() -> String {
    format!(
        r#"function {name}(id) {{
  var key = CSS.escape(id);
  var tpl = document.querySelector('template[data-resolves="' + key + '"]');
  var target = document.querySelector('[data-boundary="' + key + '"]');
  if (!tpl || !target) return;
  target.replaceChildren(tpl.content.cloneNode(true));
  target.setAttribute('data-state', tpl.getAttribute('data-state'));
  tpl.remove();
}}"#,
        name = SWAP_FUNCTION
    )
}

/// Wrap fallback HTML in a placeholder the swap function can find.
pub fn wrap_placeholder(boundary_id: &str, html: &str) -> String {
    format!(
        r#"<div data-boundary="{}" data-state="fallback">{}</div>"#,
        escape_html(boundary_id),
        html
    )
}

/// Render a frame that replaces a placeholder with its final markup.
pub fn resolution_frame(boundary_id: &str, state: &str, html: &str) -> String {
    format!(
        r#"<template data-resolves="{id}" data-state="{state}">{html}</template><script>{func}({arg})</script>"#,
        id = escape_html(boundary_id),
        state = state,
        html = html,
        func = SWAP_FUNCTION,
        arg = script_string(boundary_id)
    )
}

/// Quote a value as a JavaScript string literal safe inside `<script>`.
fn script_string(value: &str) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| String::from("\"\""))
        .replace('<', "\\u003c")
}

/// Render a boundary inline in its final state (no placeholder).
pub fn inline_boundary(boundary_id: &str, state: &str, html: &str) -> String {
    format!(
        r#"<div data-boundary="{}" data-state="{}">{}</div>"#,
        escape_html(boundary_id),
        state,
        html
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_and_frame_share_id() {
        let placeholder = wrap_placeholder("deferredPerson", "Loading person...");
        assert_eq!(
            placeholder,
            r#"<div data-boundary="deferredPerson" data-state="fallback">Loading person...</div>"#
        );

        let frame = resolution_frame("deferredPerson", "resolved", "<div>Tanner</div>");
        assert!(frame.starts_with(r#"<template data-resolves="deferredPerson""#));
        assert!(frame.ends_with(r#"<script>__deferSwap("deferredPerson")</script>"#));
    }

    #[test]
    fn test_frame_quotes_id_for_script() {
        let frame = resolution_frame(r#"say "hi"</script>"#, "resolved", "");
        assert!(frame.starts_with(
            r#"<template data-resolves="say &quot;hi&quot;&lt;/script&gt;""#
        ));
        assert!(frame.ends_with(
            r#"<script>__deferSwap("say \"hi\"\u003c/script>")</script>"#
        ));
    }

    #[test]
    fn test_swap_script_defines_function() {
        assert!(swap_script().starts_with("function __deferSwap(id)"));
    }
}
