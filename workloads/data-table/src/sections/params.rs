//! Current search params block.

use defer_sdk::defer_streaming::escape_html;

use crate::data::TableSearch;

/// Render the search params as pretty JSON under the table.
pub fn render_params(search: &TableSearch) -> String {
    format!(
        r#"<div class="search-params" data-section="params">
    <h4>Current Search Params</h4>
    <pre>{}</pre>
</div>"#,
        escape_html(&search.to_json_pretty())
    )
}
