//! A local stand-in for the upstream API that records every request it gets.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    http::Method,
    middleware::{self, Next},
    response::Response,
};

use crate::api::ApiClient;

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    #[track_caller]
    pub(crate) fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is not JSON")
    }

    /// The value of a query parameter, if it was sent.
    pub(crate) fn query_param(&self, name: &str) -> Option<String> {
        let query = self.query.as_deref()?;

        serde_urlencoded::from_str::<Vec<(String, String)>>(query)
            .expect("could not parse query")
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

type RequestLog = Arc<Mutex<Vec<RecordedRequest>>>;

pub(crate) struct FakeUpstream {
    base_url: String,
    requests: RequestLog,
}

impl FakeUpstream {
    /// Serve `router` on a random local port.
    pub(crate) async fn spawn(router: Router) -> Self {
        let requests = RequestLog::default();
        let app = router.layer(middleware::from_fn_with_state(
            requests.clone(),
            record_request,
        ));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let address = listener.local_addr().expect("local addr");
        tokio::spawn(async move { axum::serve(listener, app).await.expect("serve fake API") });

        Self {
            base_url: format!("http://{address}"),
            requests,
        }
    }

    pub(crate) fn api_client(&self) -> ApiClient {
        ApiClient::new(&self.base_url, Duration::from_secs(5)).expect("could not build API client")
    }

    /// The requests received so far, oldest first.
    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }

    /// The requests received so far for `path`.
    pub(crate) fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path == path)
            .collect()
    }
}

async fn record_request(State(log): State<RequestLog>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("could not read request body");

    log.lock().expect("request log poisoned").push(RecordedRequest {
        method: parts.method.clone(),
        path: parts.uri.path().to_owned(),
        query: parts.uri.query().map(str::to_owned),
        body: String::from_utf8_lossy(&bytes).into_owned(),
    });

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
