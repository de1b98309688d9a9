//! The entries page.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::{OffsetDateTime, macros::format_description};

use crate::{
    AppState, Error,
    api::ApiClient,
    endpoints,
    entry::Entry,
    html::{LINK_STYLE, TABLE_CELL_STYLE},
    list::{ListResource, NoFilter, SortOption, SortOrder},
    list_view::{
        ListPage, ListViewState, NoFilterForm, ViewRegistry, list_page, open_list_view,
    },
};

const NAME_ASC: SortOption = SortOption {
    key: "alpha-asc",
    label: "Name (A-Z)",
    sort_by: "name",
    order: SortOrder::Ascending,
};

const NAME_DESC: SortOption = SortOption {
    key: "alpha-desc",
    label: "Name (Z-A)",
    sort_by: "name",
    order: SortOrder::Descending,
};

const RECENTLY_SCANNED: SortOption = SortOption {
    key: "recent",
    label: "Recently scanned",
    sort_by: "lastScannedAt",
    order: SortOrder::Descending,
};

const MOST_SCANS: SortOption = SortOption {
    key: "most-scans",
    label: "Most scans",
    sort_by: "scanCount",
    order: SortOrder::Descending,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entries;

impl ListResource for Entries {
    type Row = Entry;
    type Filter = NoFilter;

    const KEY: &'static str = "entries";
    const SINGULAR: &'static str = "entry";
    const PLURAL: &'static str = "entries";
    const SORT_OPTIONS: &'static [SortOption] =
        &[NAME_ASC, NAME_DESC, RECENTLY_SCANNED, MOST_SCANS];
    const DEFAULT_SORT: SortOption = NAME_ASC;

    fn list_path(&self) -> String {
        endpoints::API_ENTRIES.to_owned()
    }

    fn bulk_path(&self) -> String {
        endpoints::API_ENTRIES.to_owned()
    }

    fn row_id(row: &Entry) -> String {
        row.code.clone()
    }

    fn initial_filter(&self) -> NoFilter {
        NoFilter
    }
}

impl ListPage for Entries {
    const VIEWS_ROUTE: &'static str = endpoints::ENTRY_LIST_VIEW;

    type FilterForm = NoFilterForm;

    fn views(state: &AppState) -> &ViewRegistry<Self> {
        &state.entry_views
    }

    fn column_headers(&self) -> Vec<&'static str> {
        vec!["Name", "Scans", "Last scanned"]
    }

    fn row_cells(&self, row: &Entry) -> Markup {
        let scans_url = endpoints::format_endpoint(endpoints::ENTRY_SCANS_VIEW, &row.code);

        html! {
            th scope="row" class="px-6 py-4 font-medium whitespace-nowrap"
            {
                a href=(scans_url) class=(LINK_STYLE) { (row.name) }
            }
            td class=(TABLE_CELL_STYLE) { (row.scan_count) }
            td class=(TABLE_CELL_STYLE)
            {
                @match row.last_scanned_at {
                    Some(scanned_at) => { (format_timestamp(scanned_at)) },
                    None => { "Never" },
                }
            }
        }
    }

    fn filter_from_form(
        &self,
        current: &NoFilter,
        _form: NoFilterForm,
    ) -> Result<NoFilter, Error> {
        Ok(*current)
    }

    fn create_action(&self) -> Option<(String, &'static str)> {
        Some((endpoints::NEW_ENTRY_VIEW.to_owned(), "New entry"))
    }
}

/// The most entries offered by an entry picker.
const ENTRY_OPTION_LIMIT: u64 = 1000;

/// Fetch the entries offered by the scan form, sorted by name.
///
/// # Errors
/// Returns an error if the API request fails.
pub async fn fetch_entry_options(api: &ApiClient) -> Result<Vec<Entry>, Error> {
    let params = [
        ("sortBy", NAME_ASC.sort_by.to_owned()),
        ("order", NAME_ASC.order.as_query_value().to_owned()),
        ("page", "1".to_owned()),
        ("limit", ENTRY_OPTION_LIMIT.to_string()),
        ("search", String::new()),
    ];

    let page = api.fetch_page::<Entry>(endpoints::API_ENTRIES, &params).await?;

    Ok(page.data)
}

/// Format a scan time for a table cell, e.g. "2026-03-07 09:30".
pub(crate) fn format_timestamp(timestamp: OffsetDateTime) -> String {
    timestamp
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_else(|_| timestamp.to_string())
}

/// Render the entries page with a freshly opened list view.
pub async fn get_entries_page(State(state): State<ListViewState<Entries>>) -> Response {
    match open_list_view(&state, Entries).await {
        Ok(fragment) => {
            list_page("Entries", endpoints::ENTRIES_VIEW, None, &fragment).into_response()
        }
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod format_timestamp_tests {
    use time::macros::datetime;

    use super::format_timestamp;

    #[test]
    fn formats_date_and_minutes() {
        assert_eq!(
            format_timestamp(datetime!(2026-03-07 09:05:59 +13)),
            "2026-03-07 09:05"
        );
    }
}
