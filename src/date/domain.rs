//! Days with scans and the filter that narrows them.

use serde::Deserialize;
use time::{Date, Weekday, macros::format_description};

use crate::{
    Error,
    list::{ListFilter, PageReset},
};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// The short names of the days of the week, indexed from Sunday.
pub const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Parse a `YYYY-MM-DD` date.
///
/// # Errors
/// Returns [Error::InvalidDate] if `text` is not a valid date.
pub fn parse_iso_date(text: &str) -> Result<Date, Error> {
    Date::parse(text.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| Error::InvalidDate(text.to_owned()))
}

/// Format a date as `YYYY-MM-DD`, the row id of a date.
pub fn format_iso_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

/// A day on which scans were recorded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanDate {
    #[serde(with = "iso_date")]
    pub date: Date,
    #[serde(default)]
    pub scan_count: u64,
}

/// The first and last days with scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[serde(with = "iso_date")]
    pub min_date: Date,
    #[serde(with = "iso_date")]
    pub max_date: Date,
}

/// A set of days of the week, where 0 is Sunday and 6 is Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySet(u8);

impl DaySet {
    pub const ALL: DaySet = DaySet(0b111_1111);
    pub const EMPTY: DaySet = DaySet(0);

    /// Collect the days in `days`, ignoring numbers outside 0..=6.
    pub fn from_days(days: impl IntoIterator<Item = u8>) -> Self {
        days.into_iter()
            .filter(|&day| day < 7)
            .fold(Self::EMPTY, |set, day| DaySet(set.0 | 1 << day))
    }

    pub fn contains(self, day: u8) -> bool {
        day < 7 && self.0 & (1 << day) != 0
    }

    pub fn contains_weekday(self, weekday: Weekday) -> bool {
        self.contains(weekday.number_days_from_sunday())
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn days(self) -> impl Iterator<Item = u8> {
        (0..7).filter(move |&day| self.contains(day))
    }
}

impl Default for DaySet {
    fn default() -> Self {
        Self::ALL
    }
}

/// The day-of-week and date range filter of the dates list.
///
/// Changing it keeps the current page; the page is clamped after the next
/// fetch if the narrower list no longer reaches it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateFilter {
    pub days: DaySet,
    pub start: Option<Date>,
    pub end: Option<Date>,
}

impl ListFilter for DateFilter {
    const PAGE_RESET: PageReset = PageReset::KeepIfValid;
    const OFFERS_MATCHING_SCOPE: bool = true;

    fn matches_nothing(&self) -> bool {
        let inverted_range =
            matches!((self.start, self.end), (Some(start), Some(end)) if start > end);

        self.days.is_empty() || inverted_range
    }

    fn query_params(&self) -> Vec<(&'static str, String)> {
        let days = self
            .days
            .days()
            .map(|day| day.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let mut params = vec![("days", days)];

        if let Some(start) = self.start {
            params.push(("startDate", format_iso_date(start)));
        }

        if let Some(end) = self.end {
            params.push(("endDate", format_iso_date(end)));
        }

        params
    }

    fn admits(&self, id: &str) -> bool {
        let Ok(date) = parse_iso_date(id) else {
            return false;
        };

        self.days.contains_weekday(date.weekday())
            && self.start.is_none_or(|start| date >= start)
            && self.end.is_none_or(|end| date <= end)
    }
}


#[cfg(test)]
mod date_filter_tests {
    use time::macros::date;

    use crate::{Error, list::ListFilter};

    use super::{DateFilter, DaySet, ScanDate, parse_iso_date};

    #[test]
    fn empty_day_set_matches_nothing() {
        let filter = DateFilter {
            days: DaySet::EMPTY,
            ..Default::default()
        };

        assert!(filter.matches_nothing());
    }

    #[test]
    fn inverted_range_matches_nothing() {
        let filter = DateFilter {
            start: Some(date!(2026 - 03 - 10)),
            end: Some(date!(2026 - 03 - 01)),
            ..Default::default()
        };

        assert!(filter.matches_nothing());
    }

    #[test]
    fn default_filter_matches_rows() {
        assert!(!DateFilter::default().matches_nothing());
    }

    #[test]
    fn query_params_join_days() {
        let filter = DateFilter {
            days: DaySet::from_days([1, 3, 5]),
            start: Some(date!(2026 - 01 - 01)),
            end: None,
        };

        assert_eq!(
            filter.query_params(),
            vec![
                ("days", "1,3,5".to_owned()),
                ("startDate", "2026-01-01".to_owned())
            ]
        );
    }

    #[test]
    fn admits_dates_on_chosen_days_within_range() {
        // 2026-03-07 is a Saturday.
        let filter = DateFilter {
            days: DaySet::from_days([6]),
            start: Some(date!(2026 - 03 - 01)),
            end: Some(date!(2026 - 03 - 31)),
        };

        assert!(filter.admits("2026-03-07"));
        assert!(!filter.admits("2026-03-08"));
        assert!(!filter.admits("2026-02-28"));
        assert!(!filter.admits("not a date"));
    }

    #[test]
    fn parses_iso_dates() {
        assert_eq!(parse_iso_date("2026-03-07"), Ok(date!(2026 - 03 - 07)));
        assert_eq!(
            parse_iso_date("07/03/2026"),
            Err(Error::InvalidDate("07/03/2026".to_owned()))
        );
    }

    #[test]
    fn decodes_scan_date() {
        let row: ScanDate =
            serde_json::from_str(r#"{"date": "2026-03-07", "scanCount": 4}"#).unwrap();

        assert_eq!(
            row,
            ScanDate {
                date: date!(2026 - 03 - 07),
                scan_count: 4
            }
        );
    }
}
