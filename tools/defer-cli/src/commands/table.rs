//! Data table command.

use anyhow::Result;
use tracing::debug;

use data_table::{
    filter_and_sort, generate_items, render_page, SortColumn, TableSearch, ROUTE_PATH,
};
use defer_sdk::defer_core::NavigationContext;

use super::TableArgs;
use crate::context::Context;

/// Query keys the table reads.
const KNOWN_PARAMS: [&str; 4] = ["sort", "sortBy", "filter", "status"];

const WIDTHS: [usize; 3] = [12, 10, 12];

/// Run the table command.
pub async fn run(args: TableArgs, ctx: &Context) -> Result<()> {
    let query = args.query.unwrap_or_default();
    let query = query.trim_start_matches('?');
    let navigation = NavigationContext::new(format!("{}?{}", ROUTE_PATH, query));
    debug!(
        navigation = %navigation.navigation_id,
        path = %navigation.path,
        query,
        "rendering data table"
    );

    let mut unknown: Vec<&str> = navigation
        .query
        .keys()
        .map(String::as_str)
        .filter(|key| !KNOWN_PARAMS.contains(key))
        .collect();
    unknown.sort_unstable();
    for key in unknown {
        ctx.output.warn(&format!("Ignoring unknown search param: {}", key));
    }

    let items = generate_items(args.count);

    if args.html {
        print!("{}", render_page(&items, query));
        return Ok(());
    }

    let search = TableSearch::from_query_string(query);
    let rows = filter_and_sort(&items, &search);

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "search": search,
            "rows": rows,
        }));
        return Ok(());
    }

    ctx.output.header("Data Table");
    let headers: Vec<String> = SortColumn::ALL
        .iter()
        .map(|column| {
            if *column == search.sort_by {
                format!("{} {}", column.display_name(), search.sort.arrow())
            } else {
                column.display_name().to_string()
            }
        })
        .collect();
    let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
    ctx.output.table_row(&headers, &WIDTHS);

    for item in &rows {
        let date = item.created_date();
        ctx.output.table_row(
            &[item.name.as_str(), item.status.as_str(), date.as_str()],
            &WIDTHS,
        );
    }
    if rows.is_empty() {
        ctx.output.info("No items match");
    }

    ctx.output.header("Current Search Params");
    println!("{}", search.to_json_pretty());
    Ok(())
}
