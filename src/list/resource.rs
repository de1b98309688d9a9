use std::fmt::Debug;

use serde::de::DeserializeOwned;

use crate::list::{ListFilter, SortOption};

/// Adapts a kind of row to the generic [crate::list::ListController].
///
/// Implementors describe where the rows come from, how they are identified and
/// sorted, and which filter narrows them.
pub trait ListResource: Clone + Debug + Send + Sync + 'static {
    type Row: DeserializeOwned + Clone + Debug + Send + Sync + 'static;
    type Filter: ListFilter;

    /// Identifies the resource in saved preferences and browser routes.
    const KEY: &'static str;
    const SINGULAR: &'static str;
    const PLURAL: &'static str;
    const SORT_OPTIONS: &'static [SortOption];
    const DEFAULT_SORT: SortOption;

    /// The API path of the list endpoint.
    fn list_path(&self) -> String;

    /// The API path under which the delete and export endpoints live.
    fn bulk_path(&self) -> String;

    fn row_id(row: &Self::Row) -> String;

    /// Rows that are not selectable are shown but can never be selected,
    /// edited or deleted.
    fn is_selectable(_row: &Self::Row) -> bool {
        true
    }

    fn initial_filter(&self) -> Self::Filter;

    fn find_sort_option(key: &str) -> Option<SortOption> {
        Self::SORT_OPTIONS
            .iter()
            .find(|option| option.key == key)
            .copied()
    }
}
