//! The scan lists of one date and of one entry.

use std::collections::BTreeSet;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    category::{Category, fetch_category_options},
    date::{format_iso_date, parse_iso_date},
    endpoints,
    entry::format_timestamp,
    error_page::ErrorPage,
    html::{FORM_CHECKBOX_STYLE, FORM_LABEL_STYLE, LINK_STYLE, TABLE_CELL_STYLE},
    list::{ListResource, SortOption, SortOrder},
    list_view::{ListPage, ListViewState, ViewRegistry, list_page, open_list_view},
    scan::{CategoryFilter, Scan, ScanParent},
};

const NEWEST: SortOption = SortOption {
    key: "newest",
    label: "Newest first",
    sort_by: "scannedAt",
    order: SortOrder::Descending,
};

const OLDEST: SortOption = SortOption {
    key: "oldest",
    label: "Oldest first",
    sort_by: "scannedAt",
    order: SortOrder::Ascending,
};

const ENTRY_NAME: SortOption = SortOption {
    key: "alpha-asc",
    label: "Entry (A-Z)",
    sort_by: "entryName",
    order: SortOrder::Ascending,
};

/// The scans of a date or an entry.
///
/// `categories` are the options of the category filter. The filter panel is
/// hidden when they could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scans {
    pub parent: ScanParent,
    pub categories: Vec<Category>,
}

impl ListResource for Scans {
    type Row = Scan;
    type Filter = CategoryFilter;

    const KEY: &'static str = "scans";
    const SINGULAR: &'static str = "scan";
    const PLURAL: &'static str = "scans";
    const SORT_OPTIONS: &'static [SortOption] = &[NEWEST, OLDEST, ENTRY_NAME];
    const DEFAULT_SORT: SortOption = NEWEST;

    fn list_path(&self) -> String {
        self.parent.api_path()
    }

    fn bulk_path(&self) -> String {
        endpoints::API_SCANS.to_owned()
    }

    fn row_id(row: &Scan) -> String {
        row.code.clone()
    }

    fn initial_filter(&self) -> CategoryFilter {
        CategoryFilter::default()
    }
}

/// The submitted filter panel of a scan list.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryFilterForm {
    #[serde(default)]
    pub categories: Vec<String>,
}

impl ListPage for Scans {
    const VIEWS_ROUTE: &'static str = endpoints::SCAN_LIST_VIEW;

    type FilterForm = CategoryFilterForm;

    fn views(state: &AppState) -> &ViewRegistry<Self> {
        &state.scan_views
    }

    fn column_headers(&self) -> Vec<&'static str> {
        vec!["Entry", "Category", "Scanned at"]
    }

    fn row_cells(&self, row: &Scan) -> Markup {
        let entry_url = endpoints::format_endpoint(endpoints::ENTRY_SCANS_VIEW, &row.entry_code);

        html! {
            th scope="row" class="px-6 py-4 font-medium whitespace-nowrap"
            {
                @if matches!(self.parent, ScanParent::Date(_)) {
                    a href=(entry_url) class=(LINK_STYLE) { (row.entry_name) }
                } @else {
                    (row.entry_name)
                }
            }
            td class=(TABLE_CELL_STYLE) { (row.category_name) }
            td class=(TABLE_CELL_STYLE) { (format_timestamp(row.scanned_at)) }
        }
    }

    fn filter_from_form(
        &self,
        _current: &CategoryFilter,
        form: CategoryFilterForm,
    ) -> Result<CategoryFilter, Error> {
        let selected: BTreeSet<String> = form.categories.into_iter().collect();
        let all_selected = self
            .categories
            .iter()
            .all(|category| selected.contains(&category.code));

        Ok(CategoryFilter {
            selected: (!all_selected).then_some(selected),
        })
    }

    fn filter_fields(&self, filter: &CategoryFilter) -> Option<Markup> {
        if self.categories.is_empty() {
            return None;
        }

        let is_checked = |code: &str| {
            filter
                .selected
                .as_ref()
                .is_none_or(|selected| selected.contains(code))
        };

        Some(html! {
            fieldset class="space-y-2"
            {
                legend class=(FORM_LABEL_STYLE) { "Categories" }

                @for category in &self.categories {
                    label class="flex items-center gap-2 text-sm"
                    {
                        input
                            type="checkbox"
                            name="categories"
                            value=(category.code)
                            checked[is_checked(&category.code)]
                            class=(FORM_CHECKBOX_STYLE);
                        (category.name)
                    }
                }
            }
        })
    }

    fn create_action(&self) -> Option<(String, &'static str)> {
        let query = match &self.parent {
            ScanParent::Date(date) => [("date", format_iso_date(*date))],
            ScanParent::Entry { code } => [("entry", code.clone())],
        };

        let query = serde_urlencoded::to_string(query)
            .inspect_err(|error| tracing::error!("Could not encode the scan form query: {error}"))
            .ok()?;

        Some((format!("{}?{query}", endpoints::NEW_SCAN_VIEW), "New scan"))
    }

    fn export_stem(&self) -> String {
        match &self.parent {
            ScanParent::Date(date) => format!("scans-{}", format_iso_date(*date)),
            ScanParent::Entry { code } => format!("scans-{code}"),
        }
    }
}

async fn open_scans_page(
    state: &ListViewState<Scans>,
    parent: ScanParent,
    title: &str,
    active_nav: &str,
) -> Response {
    let categories = fetch_category_options(&state.api)
        .await
        .inspect_err(|error| tracing::warn!("Could not fetch the category options: {error}"))
        .unwrap_or_default();

    match open_list_view(state, Scans { parent, categories }).await {
        Ok(fragment) => list_page(title, active_nav, None, &fragment).into_response(),
        Err(error) => error.into_response(),
    }
}

/// Render the scans recorded on one date.
pub async fn get_date_scans_page(
    Path(date): Path<String>,
    State(state): State<ListViewState<Scans>>,
) -> Response {
    let Ok(date) = parse_iso_date(&date) else {
        return ErrorPage::not_found().into_response();
    };

    let title = format!("Scans on {}", format_iso_date(date));

    open_scans_page(&state, ScanParent::Date(date), &title, endpoints::DATES_VIEW).await
}

/// Render the scans of one entry.
pub async fn get_entry_scans_page(
    Path(code): Path<String>,
    State(state): State<ListViewState<Scans>>,
) -> Response {
    let title = format!("Scans of entry {code}");

    open_scans_page(
        &state,
        ScanParent::Entry { code },
        &title,
        endpoints::ENTRIES_VIEW,
    )
    .await
}
