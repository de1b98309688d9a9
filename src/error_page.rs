//! Full-page error responses for requests that cannot render their normal page.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// A full HTML error page with a large status header and a hint for the user.
#[derive(Debug, Clone, Copy)]
pub struct ErrorPage<'a> {
    pub status: StatusCode,
    pub description: &'a str,
    pub fix: &'a str,
}

impl<'a> ErrorPage<'a> {
    /// The 500 page, with a custom description and fix.
    pub fn internal(description: &'a str, fix: &'a str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            description,
            fix,
        }
    }

    /// The 404 page.
    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            description: "Sorry, we couldn't find that page.",
            fix: "Check the address or go back to the homepage.",
        }
    }
}

impl Default for ErrorPage<'_> {
    fn default() -> Self {
        Self::internal(
            "Sorry, something went wrong.",
            "Try again later or check the server logs",
        )
    }
}

impl IntoResponse for ErrorPage<'_> {
    fn into_response(self) -> Response {
        let title = self.status.canonical_reason().unwrap_or("Error");
        let header = self.status.as_str();
        let markup = error_view(title, header, self.description, self.fix);

        (self.status, Html(markup.into_string())).into_response()
    }
}

/// The fallback route handler.
pub async fn get_404_not_found() -> Response {
    ErrorPage::not_found().into_response()
}

/// The page the browser is sent to after an unrecoverable error.
pub async fn get_internal_server_error_page() -> Response {
    ErrorPage::default().into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use scraper::Selector;

    use crate::test_utils::{assert_valid_html, parse_html_document};

    use super::{get_404_not_found, get_internal_server_error_page};

    #[tokio::test]
    async fn renders_not_found_page() {
        let response = get_404_not_found().await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let header = html
            .select(&Selector::parse("h1").unwrap())
            .next()
            .expect("No header found");
        assert_eq!(header.text().collect::<String>().trim(), "404");
    }

    #[tokio::test]
    async fn renders_internal_server_error_page() {
        let response = get_internal_server_error_page().await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
    }
}
