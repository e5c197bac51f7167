//! Table rows.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::search::{SortColumn, SortDirection, StatusFilter, TableSearch};

/// Row status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Active,
    Inactive,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: u32,
    pub name: String,
    pub status: ItemStatus,
    pub created_at: DateTime<Utc>,
}

/// Upper bound of how far back `created_at` goes.
const MAX_AGE_MS: i64 = 10_000_000_000;

/// Generate `count` rows named `Item 1..=count`.
pub fn generate_items(count: u32) -> Vec<Item> {
    generate_items_with(&mut rand::thread_rng(), Utc::now(), count)
}

/// Generate rows from a given random source and clock.
pub fn generate_items_with<R: Rng>(rng: &mut R, now: DateTime<Utc>, count: u32) -> Vec<Item> {
    (1..=count)
        .map(|id| Item {
            id,
            name: format!("Item {}", id),
            status: if rng.gen_bool(0.5) {
                ItemStatus::Active
            } else {
                ItemStatus::Inactive
            },
            created_at: now - Duration::milliseconds(rng.gen_range(0..MAX_AGE_MS)),
        })
        .collect()
}

impl Item {
    /// Creation date as `m/d/yyyy`.
    pub fn created_date(&self) -> String {
        self.created_at.format("%-m/%-d/%Y").to_string()
    }
}

/// Apply a search to the rows: name filter, status filter, then sort.
///
/// The name filter is a case-insensitive substring match. The sort is
/// stable, so rows that compare equal keep their generated order.
pub fn filter_and_sort(items: &[Item], search: &TableSearch) -> Vec<Item> {
    let needle = search.filter.as_deref().map(str::to_lowercase);

    let mut rows: Vec<Item> = items
        .iter()
        .filter(|item| match &needle {
            Some(needle) => item.name.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .filter(|item| match search.status {
            StatusFilter::All => true,
            StatusFilter::Active => item.status == ItemStatus::Active,
            StatusFilter::Inactive => item.status == ItemStatus::Inactive,
        })
        .cloned()
        .collect();

    rows.sort_by(|a, b| {
        let ordering = match search.sort_by {
            SortColumn::Name => a.name.cmp(&b.name),
            SortColumn::Status => a.status.as_str().cmp(b.status.as_str()),
            SortColumn::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        match search.sort {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    rows
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_generated_rows() {
        let now = Utc::now();
        let items = generate_items_with(&mut StdRng::seed_from_u64(7), now, 10);

        assert_eq!(items.len(), 10);
        assert_eq!(items[0].name, "Item 1");
        assert_eq!(items[9].id, 10);
        assert!(items.iter().all(|i| i.created_at <= now));
        assert!(items
            .iter()
            .all(|i| now - i.created_at < Duration::milliseconds(MAX_AGE_MS)));
    }

    fn item(id: u32, status: ItemStatus, age_days: i64) -> Item {
        Item {
            id,
            name: format!("Item {}", id),
            status,
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    fn names(rows: &[Item]) -> Vec<&str> {
        rows.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_default_search_sorts_by_name() {
        let items = vec![
            item(2, ItemStatus::Active, 1),
            item(10, ItemStatus::Inactive, 2),
            item(1, ItemStatus::Active, 3),
        ];
        let rows = filter_and_sort(&items, &TableSearch::default());
        // Plain string order, so "Item 10" sorts before "Item 2".
        assert_eq!(names(&rows), vec!["Item 1", "Item 10", "Item 2"]);
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let items = vec![
            item(1, ItemStatus::Active, 1),
            item(10, ItemStatus::Active, 1),
            item(2, ItemStatus::Active, 1),
        ];
        let search = TableSearch::default().with_filter("ITEM 1");
        assert_eq!(names(&filter_and_sort(&items, &search)), vec!["Item 1", "Item 10"]);
    }

    #[test]
    fn test_status_filter_and_date_sort() {
        let items = vec![
            item(1, ItemStatus::Active, 5),
            item(2, ItemStatus::Inactive, 1),
            item(3, ItemStatus::Active, 9),
            item(4, ItemStatus::Active, 2),
        ];
        let search = TableSearch::from_query_string("sort=desc&sortBy=createdAt&status=active");
        assert_eq!(
            names(&filter_and_sort(&items, &search)),
            vec!["Item 4", "Item 1", "Item 3"]
        );
    }

    #[test]
    fn test_status_sort_is_stable() {
        let items = vec![
            item(1, ItemStatus::Inactive, 1),
            item(2, ItemStatus::Active, 1),
            item(3, ItemStatus::Inactive, 1),
            item(4, ItemStatus::Active, 1),
        ];
        let search = TableSearch::from_query_string("sortBy=status");
        assert_eq!(
            names(&filter_and_sort(&items, &search)),
            vec!["Item 2", "Item 4", "Item 1", "Item 3"]
        );
    }

    #[test]
    fn test_created_date_format() {
        let mut row = item(1, ItemStatus::Active, 0);
        row.created_at = "2024-03-07T12:00:00Z".parse().unwrap();
        assert_eq!(row.created_date(), "3/7/2024");
    }
}
