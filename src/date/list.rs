//! The dates page.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error, endpoints,
    date::{
        DAY_NAMES, DateFilter, DateRange, DaySet, ScanDate, format_iso_date, parse_iso_date,
    },
    html::{
        FORM_CHECKBOX_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        TABLE_CELL_STYLE,
    },
    list::{ListResource, SortOption, SortOrder},
    list_view::{ListPage, ListViewState, ViewRegistry, list_page, open_list_view},
};

const NEWEST: SortOption = SortOption {
    key: "newest",
    label: "Newest first",
    sort_by: "date",
    order: SortOrder::Descending,
};

const OLDEST: SortOption = SortOption {
    key: "oldest",
    label: "Oldest first",
    sort_by: "date",
    order: SortOrder::Ascending,
};

const MOST_SCANS: SortOption = SortOption {
    key: "most-scans",
    label: "Most scans",
    sort_by: "scanCount",
    order: SortOrder::Descending,
};

/// The list of days that have scans.
///
/// `range` holds the first and last days with scans when the API reported
/// them; the date range filter starts out spanning it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dates {
    pub range: Option<DateRange>,
}

impl ListResource for Dates {
    type Row = ScanDate;
    type Filter = DateFilter;

    const KEY: &'static str = "dates";
    const SINGULAR: &'static str = "date";
    const PLURAL: &'static str = "dates";
    const SORT_OPTIONS: &'static [SortOption] = &[NEWEST, OLDEST, MOST_SCANS];
    const DEFAULT_SORT: SortOption = NEWEST;

    fn list_path(&self) -> String {
        endpoints::API_DATES.to_owned()
    }

    fn bulk_path(&self) -> String {
        endpoints::API_DATES.to_owned()
    }

    fn row_id(row: &ScanDate) -> String {
        format_iso_date(row.date)
    }

    fn initial_filter(&self) -> DateFilter {
        DateFilter {
            days: DaySet::ALL,
            start: self.range.map(|range| range.min_date),
            end: self.range.map(|range| range.max_date),
        }
    }
}

/// The submitted filter panel of the dates list.
///
/// Unchecked day boxes are not submitted, so an empty `days` means no day
/// is selected.
#[derive(Debug, Default, Deserialize)]
pub struct DateFilterForm {
    #[serde(default)]
    pub days: Vec<u8>,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

fn parse_optional_date(text: &str) -> Result<Option<time::Date>, Error> {
    if text.trim().is_empty() {
        Ok(None)
    } else {
        parse_iso_date(text).map(Some)
    }
}

impl ListPage for Dates {
    const VIEWS_ROUTE: &'static str = endpoints::DATE_LIST_VIEW;

    type FilterForm = DateFilterForm;

    fn views(state: &AppState) -> &ViewRegistry<Self> {
        &state.date_views
    }

    fn column_headers(&self) -> Vec<&'static str> {
        vec!["Date", "Day", "Scans"]
    }

    fn row_cells(&self, row: &ScanDate) -> Markup {
        let iso_date = format_iso_date(row.date);
        let scans_url = endpoints::format_endpoint(endpoints::DATE_SCANS_VIEW, &iso_date);
        let day_name = DAY_NAMES[usize::from(row.date.weekday().number_days_from_sunday())];

        html! {
            th scope="row" class="px-6 py-4 font-medium whitespace-nowrap"
            {
                a href=(scans_url) class=(LINK_STYLE) { (iso_date) }
            }
            td class=(TABLE_CELL_STYLE) { (day_name) }
            td class=(TABLE_CELL_STYLE) { (row.scan_count) }
        }
    }

    fn filter_from_form(
        &self,
        _current: &DateFilter,
        form: DateFilterForm,
    ) -> Result<DateFilter, Error> {
        Ok(DateFilter {
            days: DaySet::from_days(form.days),
            start: parse_optional_date(&form.start_date)?,
            end: parse_optional_date(&form.end_date)?,
        })
    }

    fn filter_fields(&self, filter: &DateFilter) -> Option<Markup> {
        let min_date = self.range.map(|range| format_iso_date(range.min_date));
        let max_date = self.range.map(|range| format_iso_date(range.max_date));
        let start = filter.start.map(format_iso_date).unwrap_or_default();
        let end = filter.end.map(format_iso_date).unwrap_or_default();

        Some(html! {
            fieldset class="space-y-2"
            {
                legend class=(FORM_LABEL_STYLE) { "Days of the week" }

                div class="flex flex-wrap gap-4"
                {
                    @for (day, name) in (0u8..).zip(DAY_NAMES) {
                        label class="inline-flex items-center gap-2 text-sm"
                        {
                            input
                                type="checkbox"
                                name="days"
                                value=(day)
                                checked[filter.days.contains(day)]
                                class=(FORM_CHECKBOX_STYLE);
                            (name)
                        }
                    }
                }
            }

            div class="grid grid-cols-2 gap-4"
            {
                div
                {
                    label for="start_date" class=(FORM_LABEL_STYLE) { "From" }
                    input
                        id="start_date"
                        type="date"
                        name="start_date"
                        value=(start)
                        min=[min_date.as_deref()]
                        max=[max_date.as_deref()]
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="end_date" class=(FORM_LABEL_STYLE) { "To" }
                    input
                        id="end_date"
                        type="date"
                        name="end_date"
                        value=(end)
                        min=[min_date.as_deref()]
                        max=[max_date.as_deref()]
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }
        })
    }
}

/// Render the dates page with a freshly opened list view.
pub async fn get_dates_page(State(state): State<ListViewState<Dates>>) -> Response {
    let range = state
        .api
        .get_data::<DateRange>(endpoints::API_DATES_RANGE)
        .await
        .inspect_err(|error| tracing::warn!("Could not fetch the range of dates: {error}"))
        .ok();

    let subtitle = range.map(|range| {
        html! {
            p class="text-sm text-gray-600 dark:text-gray-400"
            {
                "Scans from " (format_iso_date(range.min_date))
                " to " (format_iso_date(range.max_date))
            }
        }
    });

    match open_list_view(&state, Dates { range }).await {
        Ok(fragment) => list_page("Dates", endpoints::DATES_VIEW, subtitle.as_ref(), &fragment)
            .into_response(),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod dates_resource_tests {
    use time::macros::date;

    use crate::{
        Error,
        date::{DateFilter, DateRange, DaySet},
        list::ListResource,
        list_view::ListPage,
    };

    use super::{DateFilterForm, Dates};

    #[test]
    fn initial_filter_spans_range() {
        let dates = Dates {
            range: Some(DateRange {
                min_date: date!(2025 - 01 - 01),
                max_date: date!(2026 - 03 - 07),
            }),
        };

        assert_eq!(
            dates.initial_filter(),
            DateFilter {
                days: DaySet::ALL,
                start: Some(date!(2025 - 01 - 01)),
                end: Some(date!(2026 - 03 - 07)),
            }
        );
    }

    #[test]
    fn form_without_days_selects_no_day() {
        let form = DateFilterForm::default();

        let filter = Dates::default()
            .filter_from_form(&DateFilter::default(), form)
            .unwrap();

        assert!(filter.days.is_empty());
        assert_eq!(filter.start, None);
    }

    #[test]
    fn form_with_invalid_date_is_rejected() {
        let form = DateFilterForm {
            days: vec![1],
            start_date: "yesterday".to_owned(),
            end_date: String::new(),
        };

        let got = Dates::default().filter_from_form(&DateFilter::default(), form);

        assert_eq!(got, Err(Error::InvalidDate("yesterday".to_owned())));
    }

    #[test]
    fn filter_fields_check_selected_days() {
        let filter = DateFilter {
            days: DaySet::from_days([2]),
            ..Default::default()
        };

        let markup = Dates::default()
            .filter_fields(&filter)
            .expect("dates have a filter panel")
            .into_string();

        assert!(markup.contains(r#"value="2" checked"#));
        assert!(!markup.contains(r#"value="3" checked"#));
    }
}
