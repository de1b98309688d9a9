//! HTTP client for the scan server's JSON API.

use std::time::Duration;

use reqwest::{
    Client, Response, StatusCode,
    header::{CONTENT_DISPOSITION, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use time::OffsetDateTime;

use crate::{
    Error,
    list::{DeleteRequest, ExportRequest, ResultSet},
};

/// The body of a list response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListPage<T> {
    pub data: Vec<T>,
    pub total: u64,
}

impl<T> From<ListPage<T>> for ResultSet<T> {
    fn from(page: ListPage<T>) -> Self {
        ResultSet {
            rows: page.data,
            total: page.total,
        }
    }
}

/// A file produced by an export endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct MessageEnvelope {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct DeleteBody<'a> {
    codes: &'a [String],
}

/// Client for the upstream API.
///
/// Cloning is cheap, clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    /// # Errors
    /// Returns [Error::UpstreamUnreachable] if `base_url` is empty or the HTTP
    /// client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            return Err(Error::UpstreamUnreachable(
                "the API URL must not be empty".to_owned(),
            ));
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| Error::UpstreamUnreachable(error.to_string()))?;

        Ok(Self { base_url, http })
    }

    /// Fetch one page of a list.
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<ListPage<T>, Error> {
        let query = serde_urlencoded::to_string(params)
            .map_err(|error| Error::JSONSerializationError(error.to_string()))?;
        let url = format!("{}{path}?{query}", self.base_url);
        tracing::debug!("GET {url}");

        let response = self.http.get(url).send().await?;
        let response = check_status(response).await?;

        Ok(response.json().await?)
    }

    /// Fetch a resource wrapped in a `{data}` envelope.
    pub async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let response = self.http.get(self.url(path)).send().await?;
        let response = check_status(response).await?;
        let envelope: DataEnvelope<T> = response.json().await?;

        Ok(envelope.data)
    }

    /// Delete rows, returning the API's success message if it sent one.
    pub async fn delete(
        &self,
        bulk_path: &str,
        request: &DeleteRequest,
    ) -> Result<Option<String>, Error> {
        let response = match request {
            DeleteRequest::Single(code) => {
                self.http
                    .delete(self.url(&format!("{bulk_path}/{}", urlencoding::encode(code))))
                    .send()
                    .await?
            }
            DeleteRequest::Batch(codes) => {
                self.http
                    .post(self.url(&format!("{bulk_path}/delete")))
                    .json(&DeleteBody { codes })
                    .send()
                    .await?
            }
        };

        message_of(check_status(response).await?).await
    }

    /// Request an export file.
    ///
    /// The filename comes from the `content-disposition` header, falling back
    /// to `{default_stem}-{today}.{extension}`.
    pub async fn export(
        &self,
        bulk_path: &str,
        request: &ExportRequest,
        default_stem: &str,
    ) -> Result<Download, Error> {
        let url = self.url(&format!(
            "{bulk_path}/{}",
            request.format.endpoint_suffix()
        ));
        let response = self.http.post(url).json(request).send().await?;
        let response = check_status(response).await?;

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_content_disposition)
            .unwrap_or_else(|| {
                default_filename(
                    default_stem,
                    request.format.extension(),
                    OffsetDateTime::now_utc(),
                )
            });
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_owned();
        let bytes = response.bytes().await?.to_vec();

        Ok(Download {
            filename,
            content_type,
            bytes,
        })
    }

    /// POST `body` as JSON, returning the API's success message if it sent one.
    pub async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<String>, Error> {
        let response = self.http.post(self.url(path)).json(body).send().await?;

        message_of(check_status(response).await?).await
    }

    /// PUT `body` as JSON, returning the API's success message if it sent one.
    pub async fn put_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<String>, Error> {
        let response = self.http.put(self.url(path)).json(body).send().await?;

        message_of(check_status(response).await?).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Turn non-2xx responses into [Error::Upstream], keeping the text of an
/// `{error}` body.
async fn check_status(response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(upstream_error(status, &body))
}

fn upstream_error(status: StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .filter(|message| !message.trim().is_empty());

    Error::Upstream {
        status: status.as_u16(),
        message,
    }
}

async fn message_of(response: Response) -> Result<Option<String>, Error> {
    let body = response.text().await?;

    Ok(serde_json::from_str::<MessageEnvelope>(&body)
        .ok()
        .and_then(|envelope| envelope.message))
}

/// Extract the filename from a `content-disposition` header value.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    split_parameters(header)
        .into_iter()
        .filter_map(|parameter| parameter.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("filename"))
        .map(|(_, value)| value.trim().trim_matches('"').to_owned())
        .filter(|name| !name.is_empty())
}

/// Split a header value on the semicolons that are outside quoted strings.
fn split_parameters(header: &str) -> Vec<&str> {
    let mut parameters = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;

    for (index, character) in header.char_indices() {
        match character {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                parameters.push(header[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }
    parameters.push(header[start..].trim());

    parameters
}

fn default_filename(stem: &str, extension: &str, now: OffsetDateTime) -> String {
    let date = now.date();

    format!(
        "{stem}-{:04}-{:02}-{:02}.{extension}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}
