//! Data table - URL search params as the single source of table state.
//!
//! This workload demonstrates:
//! - Sort, filter and status state parsed from the query string
//! - A pure filter-then-sort pass over generated rows
//! - Header links and controls that encode the next state back into the URL

mod data;
mod sections;

use defer_sdk::defer_streaming::{HeadContent, Shell};

pub use data::*;
pub use sections::*;

/// Route path.
pub const ROUTE_PATH: &str = "/data-table";
/// Rows generated per render.
pub const DEFAULT_ITEM_COUNT: u32 = 10;

/// Render the table, controls and params block for one search.
pub fn render_table_view(items: &[Item], search: &TableSearch) -> String {
    let rows = filter_and_sort(items, search);
    format!(
        "{}\n{}\n{}",
        render_controls(search),
        render_table(&rows, search),
        render_params(search)
    )
}

/// Render the full page for a query string.
pub fn render_page(items: &[Item], query_string: &str) -> String {
    let search = TableSearch::from_query_string(query_string);
    let shell = create_shell();
    format!(
        "{}{}{}",
        shell.render_opening(),
        render_table_view(items, &search),
        shell.render_closing()
    )
}

fn create_shell() -> Shell {
    let head = HeadContent::new("Data Table")
        .with_meta("viewport", "width=device-width, initial-scale=1")
        .with_style(TABLE_STYLES);

    Shell::new(head).with_body_start("<body>\n<main class=\"p-2\">\n<h2>Data Table</h2>\n")
}

const TABLE_STYLES: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; }
.p-2 { padding: 0.5rem; }
.data-table { border-collapse: collapse; margin: 1rem 0; }
.data-table th, .data-table td { border: 1px solid #e2e8f0; padding: 0.25rem 0.75rem; text-align: left; }
.badge { border-radius: 9999px; padding: 0 0.5rem; font-size: 0.875rem; }
.badge-active { background: #dcfce7; color: #166534; }
.badge-inactive { background: #fee2e2; color: #991b1b; }
.search-params pre { background: #f1f5f9; padding: 0.5rem; }
"#;
