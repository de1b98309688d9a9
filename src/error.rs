//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use time::OffsetDateTime;

use crate::{alert::Alert, error_page::ErrorPage};

/// The message shown when a mutation fails and the upstream API did not say why.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The upstream API answered with a non-2xx status code.
    ///
    /// `message` holds the text of the `{error}` envelope when the response
    /// carried one.
    #[error("the API responded with status {status}: {message:?}")]
    Upstream {
        /// The HTTP status code of the response.
        status: u16,
        /// The error message provided by the API, if any.
        message: Option<String>,
    },

    /// The upstream API could not be reached (connection refused, timeout, etc.).
    #[error("could not reach the API: {0}")]
    UpstreamUnreachable(String),

    /// The upstream API responded with a body that could not be decoded.
    #[error("could not decode the API response: {0}")]
    InvalidResponse(String),

    /// A bulk action was requested while no rows were selected, or the chosen
    /// scope resolved to no rows.
    #[error("nothing is selected")]
    NothingSelected,

    /// A bulk step was requested out of order, e.g. confirming a delete that
    /// was never started.
    #[error("there is no bulk action waiting for this step")]
    NoBulkActionPending,

    /// The bulk action is not one of delete, CSV export or PDF export.
    #[error("unknown bulk action \"{0}\"")]
    UnknownBulkAction(String),

    /// The requested bulk scope is not available for this list.
    #[error("the scope \"{0}\" is not available for this list")]
    InvalidBulkScope(String),

    /// The sort option key is not one of the options of the list.
    #[error("unknown sort option \"{0}\"")]
    UnknownSortOption(String),

    /// The list view has been discarded (or never existed).
    #[error("the list view {0} has expired")]
    ViewExpired(u64),

    /// The list view registry lock was poisoned.
    #[error("could not acquire the list view lock")]
    ViewLockError,

    /// A category name was empty or only whitespace.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// A category name collides with the reserved "General" category.
    #[error("\"{0}\" is a reserved category name")]
    ReservedCategoryName(String),

    /// An attempt was made to edit or delete the "General" category.
    #[error("the General category cannot be changed or deleted")]
    GeneralCategoryProtected,

    /// An entry name was empty or only whitespace.
    #[error("Entry name cannot be empty")]
    EmptyEntryName,

    /// A scan was submitted without an entry.
    #[error("An entry is required")]
    MissingEntry,

    /// A scan was submitted without a category.
    #[error("A category is required")]
    MissingCategory,

    /// A date or date-time string could not be parsed.
    #[error("\"{0}\" is not a valid date")]
    InvalidDate(String),

    /// A scan time in the future was submitted.
    ///
    /// Scans record events that have already happened, therefore future
    /// timestamps are not allowed.
    #[error("{0} is in the future, which is not allowed")]
    FutureScanTime(OffsetDateTime),

    /// A page size of zero was requested.
    #[error("page size must be at least 1")]
    InvalidPageSize,

    /// The requested download has already been collected or never existed.
    #[error("there is no download waiting for this list view")]
    NoPendingDownload,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Error::InvalidResponse(value.to_string())
        } else if let Some(status) = value.status() {
            Error::Upstream {
                status: status.as_u16(),
                message: None,
            }
        } else {
            Error::UpstreamUnreachable(value.to_string())
        }
    }
}

impl Error {
    /// The text to show the user in a status message.
    ///
    /// Upstream errors use the API's own message when it sent one, validation
    /// errors use their display text, and everything else falls back to
    /// [GENERIC_FAILURE_MESSAGE].
    pub fn user_message(&self) -> String {
        match self {
            Error::Upstream {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            Error::Upstream { .. }
            | Error::InvalidResponse(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::ViewLockError
            | Error::JSONSerializationError(_) => GENERIC_FAILURE_MESSAGE.to_owned(),
            Error::UpstreamUnreachable(_) => {
                "The server could not be reached. Check your connection and try again.".to_owned()
            }
            Error::FutureScanTime(_) => {
                "The scan time is in the future. Change it to a time that has already passed."
                    .to_owned()
            }
            error => error.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Upstream { status: 404, .. } => ErrorPage::not_found().into_response(),
            Error::InvalidTimezoneError(timezone) => ErrorPage::internal(
                "Invalid Timezone Settings",
                &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            )
            .into_response(),
            Error::UpstreamUnreachable(_) => ErrorPage::internal(
                "Could not reach the scan server",
                "Check that the API server is running and try again.",
            )
            .into_response(),
            Error::DatabaseLockError | Error::ViewLockError => {
                ErrorPage::default().into_response()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                ErrorPage::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::ViewExpired(_) => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "This list has expired".to_owned(),
                    details: "Reload the page to continue.".to_owned(),
                },
            ),
            Error::NothingSelected => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Nothing selected".to_owned(),
                    details: "Select one or more rows first.".to_owned(),
                },
            ),
            Error::GeneralCategoryProtected => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Could not change category".to_owned(),
                    details: "The General category cannot be edited or deleted.".to_owned(),
                },
            ),
            Error::NoPendingDownload => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Download expired".to_owned(),
                    details: "Export the rows again to download them.".to_owned(),
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            error @ (Error::Upstream { .. }
            | Error::UpstreamUnreachable(_)
            | Error::InvalidResponse(_)) => {
                tracing::error!("An upstream request failed: {error}");

                (
                    StatusCode::BAD_GATEWAY,
                    Alert::Error {
                        message: "Request failed".to_owned(),
                        details: error.user_message(),
                    },
                )
            }
            error @ (Error::EmptyCategoryName
            | Error::ReservedCategoryName(_)
            | Error::EmptyEntryName
            | Error::MissingEntry
            | Error::MissingCategory
            | Error::InvalidDate(_)
            | Error::FutureScanTime(_)
            | Error::InvalidPageSize
            | Error::UnknownSortOption(_)
            | Error::UnknownBulkAction(_)
            | Error::InvalidBulkScope(_)
            | Error::NoBulkActionPending) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid request".to_owned(),
                    details: error.user_message(),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {error}");

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}

#[cfg(test)]
mod user_message_tests {
    use super::{Error, GENERIC_FAILURE_MESSAGE};

    #[test]
    fn uses_upstream_message_when_present() {
        let error = Error::Upstream {
            status: 400,
            message: Some("Category is in use".to_owned()),
        };

        assert_eq!(error.user_message(), "Category is in use");
    }

    #[test]
    fn falls_back_when_upstream_message_missing() {
        let error = Error::Upstream {
            status: 500,
            message: None,
        };

        assert_eq!(error.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn falls_back_when_upstream_message_blank() {
        let error = Error::Upstream {
            status: 500,
            message: Some("  ".to_owned()),
        };

        assert_eq!(error.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn validation_errors_use_display_text() {
        assert_eq!(
            Error::EmptyCategoryName.user_message(),
            "Category name cannot be empty"
        );
    }
}
