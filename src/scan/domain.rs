//! Core scan domain types and the category filter of scan lists.

use std::collections::BTreeSet;

use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    date::format_iso_date,
    endpoints,
    list::{ListFilter, PageReset},
};

/// One recorded scan of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scan {
    pub code: String,
    pub entry_code: String,
    pub entry_name: String,
    pub category_code: String,
    pub category_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub scanned_at: OffsetDateTime,
}

/// Whose scans a scan list shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanParent {
    /// The scans recorded on one day.
    Date(Date),
    /// The scans of one entry.
    Entry { code: String },
}

impl ScanParent {
    /// The API path listing the scans.
    pub fn api_path(&self) -> String {
        match self {
            ScanParent::Date(date) => {
                endpoints::format_endpoint(endpoints::API_DATE_SCANS, format_iso_date(*date))
            }
            ScanParent::Entry { code } => {
                endpoints::format_endpoint(endpoints::API_ENTRY_SCANS, code)
            }
        }
    }

    /// The browser page listing the scans.
    pub fn page_path(&self) -> String {
        match self {
            ScanParent::Date(date) => {
                endpoints::format_endpoint(endpoints::DATE_SCANS_VIEW, format_iso_date(*date))
            }
            ScanParent::Entry { code } => {
                endpoints::format_endpoint(endpoints::ENTRY_SCANS_VIEW, code)
            }
        }
    }
}

/// Narrows a scan list to a set of categories.
///
/// `None` means every category. An empty set matches no scan at all, so no
/// request is sent for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    pub selected: Option<BTreeSet<String>>,
}

impl ListFilter for CategoryFilter {
    const PAGE_RESET: PageReset = PageReset::Always;

    fn matches_nothing(&self) -> bool {
        self.selected.as_ref().is_some_and(BTreeSet::is_empty)
    }

    fn query_params(&self) -> Vec<(&'static str, String)> {
        match &self.selected {
            Some(codes) => vec![(
                "categories",
                codes.iter().cloned().collect::<Vec<_>>().join(","),
            )],
            None => Vec::new(),
        }
    }
}
