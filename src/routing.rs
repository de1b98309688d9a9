//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::get,
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    category::{
        Categories, create_category_endpoint, get_categories_page, get_edit_category_modal,
        get_new_category_modal, update_category_endpoint,
    },
    date::{Dates, get_dates_page},
    endpoints,
    entry::{Entries, create_entry_endpoint, get_entries_page, get_new_entry_modal},
    error_page::{get_404_not_found, get_internal_server_error_page},
    list_view::list_view_routes,
    scan::{
        Scans, create_scan_endpoint, get_date_scans_page, get_entry_scans_page,
        get_new_scan_modal,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::ENTRIES_VIEW, get(get_entries_page))
        .route(endpoints::CATEGORIES_VIEW, get(get_categories_page))
        .route(endpoints::DATES_VIEW, get(get_dates_page))
        .route(endpoints::DATE_SCANS_VIEW, get(get_date_scans_page))
        .route(endpoints::ENTRY_SCANS_VIEW, get(get_entry_scans_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let form_routes = Router::new()
        .route(
            endpoints::NEW_CATEGORY_VIEW,
            get(get_new_category_modal).post(create_category_endpoint),
        )
        .route(
            endpoints::EDIT_CATEGORY_VIEW,
            get(get_edit_category_modal).put(update_category_endpoint),
        )
        .route(
            endpoints::NEW_ENTRY_VIEW,
            get(get_new_entry_modal).post(create_entry_endpoint),
        )
        .route(
            endpoints::NEW_SCAN_VIEW,
            get(get_new_scan_modal).post(create_scan_endpoint),
        );

    let list_view_routes = Router::new()
        .merge(list_view_routes::<Categories>())
        .merge(list_view_routes::<Entries>())
        .merge(list_view_routes::<Dates>())
        .merge(list_view_routes::<Scans>());

    page_routes
        .merge(form_routes)
        .merge(list_view_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the entries page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::ENTRIES_VIEW)
}

#[cfg(test)]
mod router_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json, Router,
        extract::{Path, Query, State},
        routing::{delete, get, post},
    };
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde::Deserialize;
    use serde_json::{Value, json};

    use crate::{
        AppState, endpoints, pagination::PaginationConfig, test_utils::FakeUpstream,
    };

    use super::build_router;

    fn fake_api() -> Router {
        Router::new()
            .route(
                endpoints::API_ENTRIES,
                get(|| async {
                    Json(json!({
                        "data": [
                            { "code": "E-1", "name": "Ada", "scanCount": 2 },
                            { "code": "E-2", "name": "Grace", "scanCount": 0 }
                        ],
                        "total": 2
                    }))
                }),
            )
            .route(
                "/api/entries/delete",
                post(|| async { Json(json!({ "message": "Deleted 2 entries" })) }),
            )
            .route(
                endpoints::API_DATES,
                get(|| async {
                    Json(json!({
                        "data": [{ "date": "2026-03-07", "scanCount": 4 }],
                        "total": 1
                    }))
                }),
            )
            .route(
                endpoints::API_DATES_RANGE,
                get(|| async {
                    Json(json!({ "data": { "minDate": "2026-03-01", "maxDate": "2026-03-07" } }))
                }),
            )
    }

    async fn test_server(upstream: &FakeUpstream) -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().expect("Could not open in-memory database"),
            upstream.api_client(),
            "Etc/UTC",
            PaginationConfig::default(),
        )
        .expect("Could not create app state");

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn root_redirects_to_entries() {
        let upstream = FakeUpstream::spawn(fake_api()).await;
        let server = test_server(&upstream).await;

        let response = server.get(endpoints::ROOT).await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::ENTRIES_VIEW);
    }

    #[tokio::test]
    async fn sort_change_refetches_with_new_order() {
        let upstream = FakeUpstream::spawn(fake_api()).await;
        let server = test_server(&upstream).await;
        server.get(endpoints::ENTRIES_VIEW).await.assert_status_ok();

        server
            .post("/entries/views/1/sort")
            .form(&[("sort", "alpha-desc")])
            .await
            .assert_status_ok();

        let requests = upstream.requests_to(endpoints::API_ENTRIES);
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].query_param("order").as_deref(), Some("ASC"));
        assert_eq!(requests[1].query_param("sortBy").as_deref(), Some("name"));
        assert_eq!(requests[1].query_param("order").as_deref(), Some("DESC"));
        assert_eq!(requests[1].query_param("page").as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn dates_filter_without_days_sends_no_request() {
        let upstream = FakeUpstream::spawn(fake_api()).await;
        let server = test_server(&upstream).await;
        server.get(endpoints::DATES_VIEW).await.assert_status_ok();
        assert_eq!(upstream.requests_to(endpoints::API_DATES).len(), 1);

        let response = server
            .post("/dates/views/1/filter")
            .form(&[("start_date", ""), ("end_date", "")])
            .await;

        response.assert_status_ok();
        assert!(response.text().contains("No dates found."));
        assert_eq!(upstream.requests_to(endpoints::API_DATES).len(), 1);
    }

    #[tokio::test]
    async fn bulk_delete_of_selected_rows() {
        let upstream = FakeUpstream::spawn(fake_api()).await;
        let server = test_server(&upstream).await;
        server.get(endpoints::ENTRIES_VIEW).await.assert_status_ok();

        for id in ["E-1", "E-2"] {
            server
                .post("/entries/views/1/toggle")
                .form(&[("id", id)])
                .await
                .assert_status_ok();
        }

        let response = server
            .post("/entries/views/1/bulk")
            .form(&[("action", "delete")])
            .await;
        response.assert_status_ok();
        let trigger = response.header("hx-trigger");
        assert!(
            trigger.to_str().unwrap().contains("snapshot-list-bounds"),
            "want the bulk modal to request a bounds snapshot, got {trigger:?}"
        );

        server
            .post("/entries/views/1/bulk/scope")
            .form(&[("scope", "all-selected")])
            .await
            .assert_status_ok();

        let response = server.post("/entries/views/1/bulk/confirm").await;

        response.assert_status_ok();
        assert!(response.text().contains("Deleted 2 entries"));
        let deletes = upstream.requests_to("/api/entries/delete");
        assert_eq!(deletes.len(), 1);
        assert_eq!(deletes[0].json(), json!({ "codes": ["E-1", "E-2"] }));
        assert_eq!(upstream.requests_to(endpoints::API_ENTRIES).len(), 2);
    }

    #[tokio::test]
    async fn single_delete_keeps_code_in_one_path_segment() {
        let api = Router::new()
            .route(
                endpoints::API_ENTRIES,
                get(|| async {
                    Json(json!({
                        "data": [{ "code": "A/B?x", "name": "Odd", "scanCount": 0 }],
                        "total": 1
                    }))
                }),
            )
            .route(
                "/api/entries/{code}",
                delete(|Path(code): Path<String>| async move {
                    Json(json!({ "message": format!("Deleted {code}") }))
                }),
            );
        let upstream = FakeUpstream::spawn(api).await;
        let server = test_server(&upstream).await;
        server.get(endpoints::ENTRIES_VIEW).await.assert_status_ok();

        server
            .post("/entries/views/1/toggle")
            .form(&[("id", "A/B?x")])
            .await
            .assert_status_ok();
        server
            .post("/entries/views/1/bulk")
            .form(&[("action", "delete")])
            .await
            .assert_status_ok();
        server
            .post("/entries/views/1/bulk/scope")
            .form(&[("scope", "all-selected")])
            .await
            .assert_status_ok();

        let response = server.post("/entries/views/1/bulk/confirm").await;

        response.assert_status_ok();
        assert!(response.text().contains("Deleted A/B?x"));
        let deletes = upstream.requests_to("/api/entries/A%2FB%3Fx");
        assert_eq!(deletes.len(), 1);
        assert_eq!(deletes[0].method, axum::http::Method::DELETE);
        assert_eq!(deletes[0].query, None);
    }

    #[derive(Debug, Deserialize)]
    struct PageQuery {
        page: usize,
        limit: usize,
    }

    #[derive(Debug, Deserialize)]
    struct CodesBody {
        codes: Vec<String>,
    }

    type EntryCodes = Arc<Mutex<Vec<String>>>;

    /// An entries API holding `count` entries that honours `page` and `limit`.
    fn paginating_api(count: usize) -> Router {
        let codes: EntryCodes = Arc::new(Mutex::new(
            (1..=count).map(|n| format!("E-{n:03}")).collect(),
        ));

        Router::new()
            .route(
                endpoints::API_ENTRIES,
                get(
                    |State(codes): State<EntryCodes>, Query(query): Query<PageQuery>| async move {
                        let codes = codes.lock().unwrap();
                        let data: Vec<Value> = codes
                            .iter()
                            .skip((query.page - 1) * query.limit)
                            .take(query.limit)
                            .map(|code| json!({ "code": code, "name": code, "scanCount": 0 }))
                            .collect();

                        Json(json!({ "data": data, "total": codes.len() }))
                    },
                ),
            )
            .route(
                "/api/entries/delete",
                post(
                    |State(codes): State<EntryCodes>, Json(body): Json<CodesBody>| async move {
                        codes.lock().unwrap().retain(|code| !body.codes.contains(code));

                        Json(json!({ "message": format!("Deleted {} entries", body.codes.len()) }))
                    },
                ),
            )
            .with_state(codes)
    }

    #[tokio::test]
    async fn deleting_last_page_moves_to_new_last_page() {
        let upstream = FakeUpstream::spawn(paginating_api(120)).await;
        let server = test_server(&upstream).await;
        server.get(endpoints::ENTRIES_VIEW).await.assert_status_ok();
        server
            .post("/entries/views/1/page-size")
            .form(&[("page_size", "50")])
            .await
            .assert_status_ok();
        server
            .post("/entries/views/1/page")
            .form(&[("page", "3")])
            .await
            .assert_status_ok();
        server
            .post("/entries/views/1/select-all")
            .await
            .assert_status_ok();
        server
            .post("/entries/views/1/bulk")
            .form(&[("action", "delete")])
            .await
            .assert_status_ok();
        server
            .post("/entries/views/1/bulk/scope")
            .form(&[("scope", "current-page")])
            .await
            .assert_status_ok();

        let response = server.post("/entries/views/1/bulk/confirm").await;

        response.assert_status_ok();
        let deletes = upstream.requests_to("/api/entries/delete");
        assert_eq!(deletes.len(), 1);
        let deleted = deletes[0].json()["codes"].as_array().unwrap().len();
        assert_eq!(deleted, 20);

        let pages: Vec<String> = upstream
            .requests_to(endpoints::API_ENTRIES)
            .iter()
            .filter_map(|request| request.query_param("page"))
            .collect();
        assert_eq!(pages, ["1", "1", "3", "3", "2"]);

        let text = response.text();
        assert!(text.contains("E-051"), "want page 2 rendered");
        assert!(text.contains("E-100"), "want page 2 rendered");
        assert!(!text.contains("E-101"));
        assert!(!text.contains("E-050"));
    }

    #[tokio::test]
    async fn unknown_view_is_reported_as_expired() {
        let upstream = FakeUpstream::spawn(fake_api()).await;
        let server = test_server(&upstream).await;

        let response = server
            .post("/entries/views/42/page")
            .form(&[("page", "2")])
            .await;

        response.assert_status_not_found();
        assert!(response.text().contains("This list has expired"));
        assert!(upstream.requests().is_empty());
    }

    #[tokio::test]
    async fn invalid_scan_date_is_not_found() {
        let upstream = FakeUpstream::spawn(fake_api()).await;
        let server = test_server(&upstream).await;

        server
            .get("/dates/not-a-date/scans")
            .await
            .assert_status_not_found();
    }
}
