//! Core category domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Error;

/// The name of the built-in category that every scan falls back to.
///
/// The API creates it and it can never be renamed or deleted.
pub const GENERAL_CATEGORY_NAME: &str = "General";

/// Whether `name` refers to the built-in General category.
pub fn is_general(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case(GENERAL_CATEGORY_NAME)
}

/// A validated category name: not empty and not the reserved General name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// - [Error::EmptyCategoryName] if `name` is empty or only whitespace.
    /// - [Error::ReservedCategoryName] if `name` is "General" in any casing.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else if is_general(name) {
            Err(Error::ReservedCategoryName(name.to_owned()))
        } else {
            Ok(Self(name.to_owned()))
        }
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A category as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub scan_count: u64,
}

impl Category {
    pub fn is_general(&self) -> bool {
        is_general(&self.name)
    }
}

/// Form data for category creation and renaming.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryFormData {
    pub name: String,
}

/// The body the API expects when creating or renaming a category.
#[derive(Debug, Serialize)]
pub(crate) struct CategoryBody<'a> {
    pub name: &'a str,
}

#[cfg(test)]
mod category_name_tests {
    use crate::Error;

    use super::{CategoryName, is_general};

    #[test]
    fn trims_name() {
        let name = CategoryName::new("  Staff ").unwrap();

        assert_eq!(name.as_ref(), "Staff");
    }

    #[test]
    fn rejects_empty_name() {
        assert_eq!(CategoryName::new("   "), Err(Error::EmptyCategoryName));
    }

    #[test]
    fn rejects_general_in_any_casing() {
        for name in ["General", "general", " GENERAL "] {
            assert_eq!(
                CategoryName::new(name),
                Err(Error::ReservedCategoryName(name.trim().to_owned()))
            );
        }
    }

    #[test]
    fn general_is_detected_case_insensitively() {
        assert!(is_general("gEnErAl"));
        assert!(!is_general("Generally"));
    }
}
