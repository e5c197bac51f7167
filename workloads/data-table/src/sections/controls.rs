//! Filter controls.
//!
//! Both controls submit a plain GET form, so the next render reads its
//! state back from the query string.

use defer_sdk::defer_streaming::escape_html;

use crate::data::{StatusFilter, TableSearch};

/// Render the name filter input and status select.
pub fn render_controls(search: &TableSearch) -> String {
    let options: String = StatusFilter::ALL
        .iter()
        .map(|status| {
            let selected = if *status == search.status { " selected" } else { "" };
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                status.as_str(),
                selected,
                status.display_name()
            )
        })
        .collect();

    format!(
        r#"<form class="table-controls" method="get" data-section="controls">
    <input type="hidden" name="sort" value="{sort}">
    <input type="hidden" name="sortBy" value="{sort_by}">
    <input type="text" name="filter" placeholder="Filter by name..." value="{filter}">
    <select name="status" onchange="this.form.submit()">{options}</select>
</form>"#,
        sort = search.sort.as_str(),
        sort_by = search.sort_by.as_str(),
        filter = escape_html(search.filter.as_deref().unwrap_or("")),
    )
}
