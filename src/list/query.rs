//! What subset of rows the user wants to see and in which order.

use std::fmt::Debug;

use serde::Serialize;

use crate::{Error, pagination::page_count};

/// The direction of a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortOrder {
    #[serde(rename = "ASC")]
    Ascending,
    #[serde(rename = "DESC")]
    Descending,
}

impl SortOrder {
    /// The value of the `order` query parameter.
    pub fn as_query_value(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// One entry of a list's sort menu.
///
/// `key` identifies the option in forms and in the saved preferences, while
/// `sort_by` and `order` are what the API receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOption {
    pub key: &'static str,
    pub label: &'static str,
    pub sort_by: &'static str,
    pub order: SortOrder,
}

/// How a filter change treats the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageReset {
    /// Go back to the first page on every change.
    Always,
    /// Stay on the current page; it is clamped after the next fetch if the
    /// filtered list no longer reaches it.
    KeepIfValid,
}

/// The resource-specific part of a list query.
pub trait ListFilter: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// How changing this filter treats the current page.
    const PAGE_RESET: PageReset;

    /// Whether bulk deletes may be narrowed to the selected rows this filter admits.
    const OFFERS_MATCHING_SCOPE: bool = false;

    /// Whether the filter structurally excludes every row, e.g. because one of
    /// its sets is empty. No request is sent for such a filter.
    fn matches_nothing(&self) -> bool {
        false
    }

    /// The query parameters that express this filter.
    fn query_params(&self) -> Vec<(&'static str, String)>;

    /// Whether the row with the id `id` satisfies the filter.
    fn admits(&self, _id: &str) -> bool {
        true
    }
}

/// The filter of lists that are only narrowed by the search text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoFilter;

impl ListFilter for NoFilter {
    const PAGE_RESET: PageReset = PageReset::Always;

    fn query_params(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// Sort, search, filter and pagination of one list view.
///
/// `page` is 1-based and never drops below 1.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<F> {
    sort: SortOption,
    search: String,
    page: u64,
    page_size: u64,
    filter: F,
}

impl<F: ListFilter> QueryState<F> {
    pub fn new(sort: SortOption, page_size: u64, filter: F) -> Self {
        Self {
            sort,
            search: String::new(),
            page: 1,
            page_size: page_size.max(1),
            filter,
        }
    }

    pub fn sort(&self) -> SortOption {
        self.sort
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn set_sort(&mut self, sort: SortOption) {
        self.sort = sort;
        self.page = 1;
    }

    pub fn set_search(&mut self, text: &str) {
        self.search = text.to_owned();
        self.page = 1;
    }

    /// Merge a change into the filter, resetting the page according to
    /// [ListFilter::PAGE_RESET].
    pub fn update_filter(&mut self, update: impl FnOnce(&mut F)) {
        update(&mut self.filter);

        if F::PAGE_RESET == PageReset::Always {
            self.page = 1;
        }
    }

    pub fn set_page(&mut self, page: u64) {
        self.page = page.max(1);
    }

    /// # Errors
    /// Returns [Error::InvalidPageSize] if `page_size` is zero.
    pub fn set_page_size(&mut self, page_size: u64) -> Result<(), Error> {
        if page_size == 0 {
            return Err(Error::InvalidPageSize);
        }

        self.page_size = page_size;
        self.page = 1;

        Ok(())
    }

    /// Move the page down to the last page when `total` no longer reaches it.
    ///
    /// Returns whether the page changed. An empty list leaves the page alone.
    pub fn clamp_to_total(&mut self, total: u64) -> bool {
        if total == 0 {
            return false;
        }

        let last_page = page_count(total, self.page_size);
        if self.page > last_page {
            self.page = last_page;
            return true;
        }

        false
    }

    /// The query parameters of the list request for this state.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("sortBy", self.sort.sort_by.to_owned()),
            ("order", self.sort.order.as_query_value().to_owned()),
            ("page", self.page.to_string()),
            ("limit", self.page_size.to_string()),
            ("search", self.search.clone()),
        ];
        params.extend(self.filter.query_params());

        params
    }
}
