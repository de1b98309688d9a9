//! The browser routes served by the app and the upstream API paths it consumes.
//!
//! For endpoints that take a parameter, e.g., '/categories/{code}/edit', use [format_endpoint].

use std::fmt::Display;

/// The root route which redirects to the entries page.
pub const ROOT: &str = "/";
/// The page listing entries.
pub const ENTRIES_VIEW: &str = "/entries";
/// The page listing categories.
pub const CATEGORIES_VIEW: &str = "/categories";
/// The page listing the dates that have scans.
pub const DATES_VIEW: &str = "/dates";
/// The page listing the scans of one date.
pub const DATE_SCANS_VIEW: &str = "/dates/{date}/scans";
/// The page listing the scans of one entry.
pub const ENTRY_SCANS_VIEW: &str = "/entries/{code}/scans";
/// The create category form (GET) and its submission (POST).
pub const NEW_CATEGORY_VIEW: &str = "/categories/new";
/// The rename category form (GET) and its submission (PUT).
pub const EDIT_CATEGORY_VIEW: &str = "/categories/{code}/edit";
/// The create entry form (GET) and its submission (POST).
pub const NEW_ENTRY_VIEW: &str = "/entries/new";
/// The create scan form (GET) and its submission (POST).
pub const NEW_SCAN_VIEW: &str = "/scans/new";
/// The interaction routes of one category list view.
pub const CATEGORY_LIST_VIEW: &str = "/categories/views/{view_id}";
/// The interaction routes of one entry list view.
pub const ENTRY_LIST_VIEW: &str = "/entries/views/{view_id}";
/// The interaction routes of one date list view.
pub const DATE_LIST_VIEW: &str = "/dates/views/{view_id}";
/// The interaction routes of one scan list view.
pub const SCAN_LIST_VIEW: &str = "/scans/views/{view_id}";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The upstream category list, create and bulk endpoints.
pub const API_CATEGORIES: &str = "/api/categories";
/// A single upstream category.
pub const API_CATEGORY: &str = "/api/categories/{code}";
/// The upstream entry list, create and bulk endpoints.
pub const API_ENTRIES: &str = "/api/entries";
/// The upstream date list and bulk endpoints.
pub const API_DATES: &str = "/api/dates";
/// The first and last dates that have scans.
pub const API_DATES_RANGE: &str = "/api/dates/range";
/// The upstream scans of one date.
pub const API_DATE_SCANS: &str = "/api/dates/{date}/scans";
/// The upstream scans of one entry.
pub const API_ENTRY_SCANS: &str = "/api/entries/{code}/scans";
/// The upstream scan create and bulk endpoints.
pub const API_SCANS: &str = "/api/scans";

/// Replace the parameter in `endpoint_path` with `value`, percent-encoded as
/// a single path segment.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/categories/{code}', '{code}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, value: impl Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        urlencoding::encode(&value.to_string()),
        &endpoint_path[param_end..]
    )
}

/// The route of one interaction of a list view, e.g. `/dates/views/3/sort`.
pub fn list_view_action(list_view_route: &str, view_id: u64, action: &str) -> String {
    format!("{}/{action}", format_endpoint(list_view_route, view_id))
}
