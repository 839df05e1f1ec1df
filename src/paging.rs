use serde::Serialize;

use crate::criteria::Criteria;

/// One page of results with the arithmetic a pager needs.
///
/// ```rust
/// use sql_paging_dao::prelude::*;
///
/// let page = Paging::new(vec![1, 2, 3], 45, Criteria::paged(3, 20));
/// assert_eq!(page.total_pages, 3);
/// assert!(page.is_last);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging<T> {
    pub items: Vec<T>,
    pub total_elements: i64,
    pub total_pages: i64,
    pub page_no: i64,
    pub page_size: i64,
    pub is_first: bool,
    pub is_last: bool,
    pub criteria: Criteria,
}

impl<T> Paging<T> {
    /// Assemble a page and compute its totals and flags from `criteria`.
    #[must_use]
    pub fn new(items: Vec<T>, total_elements: i64, criteria: Criteria) -> Self {
        let mut paging = Self {
            items,
            total_elements,
            total_pages: 0,
            page_no: criteria.normalized_page().unwrap_or(0),
            page_size: criteria.size.unwrap_or(0),
            is_first: true,
            is_last: false,
            criteria,
        };
        paging.calculate();
        paging
    }

    /// An empty page for a query that matched nothing.
    #[must_use]
    pub fn empty(criteria: Criteria) -> Self {
        Self::new(Vec::new(), 0, criteria)
    }

    /// `ceil(total_elements / size)`, or 0 when `size` is not positive.
    #[must_use]
    pub fn calculate_total_pages(total_elements: i64, size: i64) -> i64 {
        if total_elements <= 0 || size <= 0 {
            return 0;
        }
        total_elements / size + i64::from(total_elements % size != 0)
    }

    fn calculate(&mut self) {
        let page = match self.criteria.normalized_page() {
            Some(page) if self.total_elements > 0 && self.criteria.is_paged() => page,
            _ => {
                self.total_pages = 0;
                self.is_first = true;
                self.is_last = false;
                return;
            }
        };
        self.total_pages = Self::calculate_total_pages(self.total_elements, self.page_size);
        self.is_first = page == 1;
        self.is_last = page >= self.total_pages;
    }

    #[must_use]
    pub fn item_size(&self) -> usize {
        self.items.len()
    }

    pub fn add_item(&mut self, item: T) {
        self.items.push(item);
    }

    /// Convert the items while keeping totals and flags.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Paging<U> {
        Paging {
            items: self.items.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            page_no: self.page_no,
            page_size: self.page_size,
            is_first: self.is_first,
            is_last: self.is_last,
            criteria: self.criteria,
        }
    }
}
