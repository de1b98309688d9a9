//! Core entry domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::Error;

/// A validated, non-empty entry name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryName(String);

impl EntryName {
    /// Create an entry name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyEntryName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyEntryName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }
}

impl AsRef<str> for EntryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for EntryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Something that gets scanned, e.g. a person or a badge.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub scan_count: u64,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_scanned_at: Option<OffsetDateTime>,
}

/// Form data for entry creation.
#[derive(Debug, Serialize, Deserialize)]
pub struct EntryFormData {
    pub name: String,
}

#[cfg(test)]
mod entry_tests {
    use time::macros::datetime;

    use crate::Error;

    use super::{Entry, EntryName};

    #[test]
    fn rejects_blank_name() {
        assert_eq!(EntryName::new(" \t"), Err(Error::EmptyEntryName));
    }

    #[test]
    fn decodes_api_row() {
        let json = r#"{
            "code": "E-7",
            "name": "Ada",
            "scanCount": 12,
            "lastScannedAt": "2026-03-07T09:30:00Z"
        }"#;

        let entry: Entry = serde_json::from_str(json).unwrap();

        assert_eq!(
            entry,
            Entry {
                code: "E-7".to_owned(),
                name: "Ada".to_owned(),
                scan_count: 12,
                last_scanned_at: Some(datetime!(2026-03-07 09:30 UTC)),
            }
        );
    }

    #[test]
    fn decodes_row_without_scans() {
        let entry: Entry = serde_json::from_str(r#"{"code": "E-8", "name": "Bo"}"#).unwrap();

        assert_eq!(entry.scan_count, 0);
        assert_eq!(entry.last_scanned_at, None);
    }
}
