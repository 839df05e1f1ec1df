use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::SqlDaoError;

/// Sort direction for an ORDER BY column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "ASC", alias = "asc", alias = "Asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc", alias = "Desc")]
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = SqlDaoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortDirection::Asc),
            "DESC" => Ok(SortDirection::Desc),
            other => Err(SqlDaoError::InvalidIdentifier(format!(
                "sort direction '{other}'"
            ))),
        }
    }
}

/// The row window a paginated query should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Zero-based index of the first row on the page.
    pub row_start: i64,
    /// Number of rows on a full page.
    pub size: i64,
}

impl PageWindow {
    /// One-based index of the first row, for ROWNUM-style dialects.
    #[must_use]
    pub fn oracle_row_start(&self) -> i64 {
        self.row_start.saturating_add(1)
    }

    /// One-based index of the last row, for ROWNUM-style dialects.
    #[must_use]
    pub fn oracle_row_end(&self) -> i64 {
        self.row_start.saturating_add(self.size)
    }
}

/// A page request: page number, page size, sort directives and a fallback
/// ORDER BY column.
///
/// Pagination is active only when both `page` and `size` are set.
/// ```rust
/// use sql_paging_dao::prelude::*;
///
/// let criteria = Criteria::paged(2, 20).with_sort("name", SortDirection::Desc);
/// assert_eq!(criteria.window().map(|w| w.row_start), Some(20));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criteria {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub order_by_column: Option<String>,
    #[serde(default)]
    pub sorts: IndexMap<String, SortDirection>,
}

impl Criteria {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn paged(page: i64, size: i64) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by_column = Some(column.into());
        self
    }

    #[must_use]
    pub fn with_sort(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.add_sort(column, direction);
        self
    }

    /// Add or replace a sort directive; a replaced column keeps its position.
    pub fn add_sort(&mut self, column: impl Into<String>, direction: SortDirection) {
        self.sorts.insert(column.into(), direction);
    }

    #[must_use]
    pub fn is_paged(&self) -> bool {
        self.page.is_some() && self.size.is_some()
    }

    #[must_use]
    pub fn is_empty_sort(&self) -> bool {
        self.sorts.is_empty()
    }

    /// True when no count query is needed beyond the first page.
    #[must_use]
    pub fn is_count_query(&self) -> bool {
        self.page.is_none_or(|page| page <= 1)
    }

    /// The requested page with values `<= 0` clamped to 1.
    #[must_use]
    pub fn normalized_page(&self) -> Option<i64> {
        self.page.map(|page| page.max(1))
    }

    /// The row window, or `None` when pagination is not active.
    #[must_use]
    pub fn window(&self) -> Option<PageWindow> {
        let page = self.normalized_page()?;
        let size = self.size?.max(0);
        Some(PageWindow {
            row_start: (page - 1).saturating_mul(size),
            size,
        })
    }

    #[must_use]
    pub fn my_sql_offset(&self) -> Option<i64> {
        self.window().map(|w| w.row_start)
    }

    #[must_use]
    pub fn ms_sql_offset(&self) -> Option<i64> {
        self.my_sql_offset()
    }

    #[must_use]
    pub fn oracle_row_start(&self) -> Option<i64> {
        self.window().map(|w| w.oracle_row_start())
    }

    #[must_use]
    pub fn oracle_row_end(&self) -> Option<i64> {
        self.window().map(|w| w.oracle_row_end())
    }

    /// Copy page, size and sorts from another request.
    pub fn set_paging_and_sorting(&mut self, other: &Criteria) {
        self.page = other.page;
        self.size = other.size;
        self.sorts = other.sorts.clone();
    }
}
