//! Table section - sortable headers and rows.

use defer_sdk::defer_streaming::escape_html;

use crate::data::{Item, ItemStatus, SortColumn, TableSearch};

/// Render the table for already filtered and sorted rows.
pub fn render_table(rows: &[Item], search: &TableSearch) -> String {
    let headers: String = SortColumn::ALL
        .iter()
        .map(|column| render_header(*column, search))
        .collect();

    let body: String = if rows.is_empty() {
        r#"<tr><td colspan="3" class="empty">No items match</td></tr>"#.to_string()
    } else {
        rows.iter().map(render_row).collect()
    };

    format!(
        r#"<table class="data-table" data-section="table">
    <thead><tr>{headers}</tr></thead>
    <tbody>{body}</tbody>
</table>"#
    )
}

/// Header cell linking to the search with this column's sort toggled.
fn render_header(column: SortColumn, search: &TableSearch) -> String {
    let arrow = if search.sort_by == column {
        format!(" {}", search.sort.arrow())
    } else {
        String::new()
    };

    format!(
        r#"<th><a href="?{}">{}{}</a></th>"#,
        escape_html(&search.toggle_sort(column).to_query_string()),
        column.display_name(),
        arrow
    )
}

fn render_row(item: &Item) -> String {
    format!(
        r#"<tr data-id="{}"><td>{}</td><td>{}</td><td>{}</td></tr>"#,
        item.id,
        escape_html(&item.name),
        render_status_badge(item.status),
        item.created_date()
    )
}

fn render_status_badge(status: ItemStatus) -> String {
    let (class, label) = match status {
        ItemStatus::Active => ("badge badge-active", "active"),
        ItemStatus::Inactive => ("badge badge-inactive", "inactive"),
    };
    format!(r#"<span class="{class}">{label}</span>"#)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_header_links_toggle_sort() {
        let search = TableSearch::default();
        let html = render_table(&[], &search);

        assert!(html.contains(r#"<a href="?sort=desc&amp;sortBy=name&amp;status=all">Name ↑</a>"#));
        assert!(html.contains(r#"<a href="?sort=asc&amp;sortBy=status&amp;status=all">Status</a>"#));
        assert!(html.contains("No items match"));
    }

    #[test]
    fn test_rows_render_badges() {
        let rows = vec![Item {
            id: 3,
            name: "Item 3".into(),
            status: ItemStatus::Inactive,
            created_at: Utc::now(),
        }];
        let search = TableSearch::from_query_string("sort=desc&sortBy=createdAt");
        let html = render_table(&rows, &search);

        assert!(html.contains("Created At ↓"));
        assert!(html.contains(r#"<span class="badge badge-inactive">inactive</span>"#));
        assert!(html.contains(r#"<tr data-id="3"><td>Item 3</td>"#));
    }
}
