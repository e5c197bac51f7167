//! Table search parameters carried in the URL.

use serde::{Deserialize, Serialize};

use defer_sdk::defer_core::{encode_component, parse_query};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Arrow shown next to the sorted column.
    pub fn arrow(&self) -> &'static str {
        match self {
            Self::Asc => "↑",
            Self::Desc => "↓",
        }
    }
}

/// Sortable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortColumn {
    #[default]
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "status")]
    Status,
    #[serde(rename = "createdAt")]
    CreatedAt,
}

impl SortColumn {
    /// All columns, in display order.
    pub const ALL: [SortColumn; 3] = [Self::Name, Self::Status, Self::CreatedAt];

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "name" => Some(Self::Name),
            "status" => Some(Self::Status),
            "createdAt" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Status => "status",
            Self::CreatedAt => "createdAt",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Status => "Status",
            Self::CreatedAt => "Created At",
        }
    }
}

/// Status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    Active,
    Inactive,
    #[default]
    All,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 3] = [Self::All, Self::Active, Self::Inactive];

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::All => "all",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::All => "All Status",
        }
    }
}

/// Immutable table configuration for one render.
///
/// Unknown keys are ignored and invalid values fall back to their
/// defaults, so any query string yields a usable search.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSearch {
    pub sort: SortDirection,
    pub sort_by: SortColumn,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    pub status: StatusFilter,
}

impl TableSearch {
    /// Parse search params from a URL query string.
    pub fn from_query_string(qs: &str) -> Self {
        let params = parse_query(qs.trim_start_matches('?'));
        let get = |key: &str| params.get(key).map(String::as_str);

        Self {
            sort: get("sort").and_then(SortDirection::from_str).unwrap_or_default(),
            sort_by: get("sortBy").and_then(SortColumn::from_str).unwrap_or_default(),
            filter: get("filter").filter(|f| !f.is_empty()).map(str::to_string),
            status: get("status").and_then(StatusFilter::from_str).unwrap_or_default(),
        }
    }

    /// Serialize back to a query string.
    pub fn to_query_string(&self) -> String {
        let mut pairs = vec![
            format!("sort={}", self.sort.as_str()),
            format!("sortBy={}", self.sort_by.as_str()),
        ];
        if let Some(filter) = &self.filter {
            pairs.push(format!("filter={}", encode_component(filter)));
        }
        pairs.push(format!("status={}", self.status.as_str()));
        pairs.join("&")
    }

    /// Search after clicking a column header.
    ///
    /// Clicking the column already sorted ascending flips it to descending;
    /// anything else sorts the clicked column ascending.
    pub fn toggle_sort(&self, column: SortColumn) -> Self {
        let sort = if self.sort_by == column && self.sort == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        Self {
            sort,
            sort_by: column,
            ..self.clone()
        }
    }

    /// Search with a new name filter. An empty filter clears it.
    pub fn with_filter(&self, filter: &str) -> Self {
        Self {
            filter: Some(filter.to_string()).filter(|f| !f.is_empty()),
            ..self.clone()
        }
    }

    /// Search with a new status filter.
    pub fn with_status(&self, status: StatusFilter) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Pretty JSON of the params, as shown under the table.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
