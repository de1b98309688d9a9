//! Calendar days with scans, filterable by day of the week and date range.

mod domain;
mod list;

pub use domain::{
    DAY_NAMES, DateFilter, DateRange, DaySet, ScanDate, format_iso_date, parse_iso_date,
};
pub use list::{Dates, get_dates_page};
