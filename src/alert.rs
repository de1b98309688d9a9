//! Alert system for displaying success and error messages to users.
//!
//! Alerts are the transient status messages of the app: list views show the
//! latest one above the table, and endpoints that fail outside of a list view
//! swap one into the page's alert container.

use axum::response::{Html, IntoResponse, Response};
use maud::{Markup, html};

/// A dismissible status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// A success message with extra details.
    Success { message: String, details: String },
    /// A success message without details.
    SuccessSimple { message: String },
    /// An error message with extra details.
    Error { message: String, details: String },
}

impl Alert {
    /// Create an error alert whose details are `details`.
    pub fn error(message: &str, details: impl Into<String>) -> Self {
        Self::Error {
            message: message.to_owned(),
            details: details.into(),
        }
    }

    /// Create a success alert without details.
    pub fn success(message: impl Into<String>) -> Self {
        Self::SuccessSimple {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Alert::Error { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Alert::Success { message, .. }
            | Alert::SuccessSimple { message }
            | Alert::Error { message, .. } => message,
        }
    }

    pub fn into_markup(self) -> Markup {
        let (container_style, message, details) = match self {
            Alert::Success { message, details } => (SUCCESS_STYLE, message, details),
            Alert::SuccessSimple { message } => (SUCCESS_STYLE, message, String::new()),
            Alert::Error { message, details } => (ERROR_STYLE, message, details),
        };

        html!(
            div
                role="alert"
                class=(container_style)
                data-alert="true"
            {
                div class="flex items-start justify-between gap-4"
                {
                    div
                    {
                        p class="font-medium" { (message) }

                        @if !details.is_empty() {
                            span class="text-sm" { (details) }
                        }
                    }

                    button
                        type="button"
                        aria-label="Dismiss"
                        class="text-lg leading-none"
                        onclick="this.closest('[data-alert]').remove()"
                    {
                        "×"
                    }
                }
            }
        )
    }

    pub fn into_html(self) -> Html<String> {
        Html(self.into_markup().into_string())
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}

const SUCCESS_STYLE: &str = "p-4 mb-4 text-green-800 rounded-lg bg-green-50 \
    dark:bg-gray-800 dark:text-green-400";

const ERROR_STYLE: &str = "p-4 mb-4 text-red-800 rounded-lg bg-red-50 \
    dark:bg-gray-800 dark:text-red-400";

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::Alert;

    #[test]
    fn renders_message_and_details() {
        let markup = Alert::error("Could not delete", "The server said no.").into_markup();

        let html = Html::parse_fragment(&markup.into_string());
        let paragraph = html
            .select(&Selector::parse("p").unwrap())
            .next()
            .expect("No message found");
        let span = html
            .select(&Selector::parse("span").unwrap())
            .next()
            .expect("No details found");

        assert_eq!(paragraph.text().collect::<String>(), "Could not delete");
        assert_eq!(span.text().collect::<String>(), "The server said no.");
    }

    #[test]
    fn simple_success_has_no_details() {
        let markup = Alert::success("Deleted 2 categories").into_markup();

        let html = Html::parse_fragment(&markup.into_string());

        assert!(
            html.select(&Selector::parse("span").unwrap())
                .next()
                .is_none()
        );
    }
}
