//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{request, response},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// The number of body bytes logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return axum::http::StatusCode::BAD_REQUEST.into_response();
        }
    };
    log_request(&parts, &bytes);

    let response = next
        .run(Request::from_parts(parts, Body::from(bytes)))
        .await;

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    log_response(&parts, &bytes);

    Response::from_parts(parts, Body::from(bytes))
}

/// The body as text, cut to [LOG_BODY_LENGTH_LIMIT] bytes, and whether it was cut.
fn truncated_body(bytes: &Bytes) -> (String, bool) {
    let is_truncated = bytes.len() > LOG_BODY_LENGTH_LIMIT;
    let shown = &bytes[..bytes.len().min(LOG_BODY_LENGTH_LIMIT)];

    (String::from_utf8_lossy(shown).into_owned(), is_truncated)
}

fn log_request(parts: &request::Parts, body: &Bytes) {
    let (text, is_truncated) = truncated_body(body);

    if is_truncated {
        tracing::info!("Received request: {parts:#?}\nbody: {text}...");
        tracing::debug!("Full request body: {:?}", String::from_utf8_lossy(body));
    } else {
        tracing::info!("Received request: {parts:#?}\nbody: {text:?}");
    }
}

fn log_response(parts: &response::Parts, body: &Bytes) {
    let (text, is_truncated) = truncated_body(body);

    if is_truncated {
        tracing::info!("Sending response: {parts:#?}\nbody: {text}...");
        tracing::debug!("Full response body: {:?}", String::from_utf8_lossy(body));
    } else {
        tracing::info!("Sending response: {parts:#?}\nbody: {text:?}");
    }
}
