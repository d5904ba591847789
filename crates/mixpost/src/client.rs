//! HTTP access to the Mixpost API
//!
//! [`MixpostClient`] is the only place that talks to the network. It issues single
//! requests, walks paginated listings and uploads media; failures come back as
//! [`Error`] values with messages composed by `mixpost_core::errors`.

use mixpost_core::errors::{compose_api_failure, fallback_status_message};
use mixpost_core::pagination::{next_step, page_items, page_query, PageStep, DEFAULT_MAX_PAGES};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::Method;
use serde_json::{Map, Value};

use crate::binary::Attachment;
use crate::config::Credentials;
use crate::prelude::*;

/// Authenticated client bound to one Mixpost installation
#[derive(Debug, Clone)]
pub struct MixpostClient {
    http: reqwest::Client,
    credentials: Credentials,
    max_pages: u32,
}

impl MixpostClient {
    pub fn new(credentials: Credentials) -> ApiResult<Self> {
        let mut token = HeaderValue::from_str(&format!("Bearer {}", credentials.access_token))
            .map_err(|e| Error::Config(format!("Invalid access token: {e}")))?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, token);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            credentials,
            max_pages: DEFAULT_MAX_PAGES,
        })
    }

    /// Cap the number of pages a single "return all" walk may fetch
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Issue one JSON request against `{base_url}{api_path}{endpoint}`.
    ///
    /// POST and PUT always carry a JSON body (`{}` when `body` is `None`); GET and DELETE
    /// never do. An empty success body is returned as `Value::Null`.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
        query: &Map<String, Value>,
    ) -> ApiResult<Value> {
        let url = self.credentials.endpoint_url(endpoint);
        log::debug!("{method} {url} query={}", Value::Object(query.clone()));

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");

        if !query.is_empty() {
            builder = builder.query(&query_pairs(query));
        }

        if method == Method::POST || method == Method::PUT {
            let empty = Value::Object(Map::new());
            builder = builder.json(body.unwrap_or(&empty));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let text = response.text().await.unwrap_or_default();
            let body = serde_json::from_str(&text).unwrap_or(Value::Null);

            let failure = compose_api_failure(status.as_u16(), &body, retry_after.as_deref());
            log::debug!("{method} {url} failed: {}", failure.message);
            return Err(failure.into());
        }

        let text = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        parse_success_body(status.as_u16(), &text)
    }

    pub async fn get(&self, endpoint: &str, query: &Map<String, Value>) -> ApiResult<Value> {
        self.request(Method::GET, endpoint, None, query).await
    }

    pub async fn post(&self, endpoint: &str, body: &Value) -> ApiResult<Value> {
        self.request(Method::POST, endpoint, Some(body), &Map::new())
            .await
    }

    pub async fn put(&self, endpoint: &str, body: &Value) -> ApiResult<Value> {
        self.request(Method::PUT, endpoint, Some(body), &Map::new())
            .await
    }

    pub async fn delete(&self, endpoint: &str) -> ApiResult<Value> {
        self.request(Method::DELETE, endpoint, None, &Map::new())
            .await
    }

    /// Fetch every page of a listing and concatenate the `data` arrays in page order.
    ///
    /// Pages are requested one after another with `page` and `per_page=50` merged into
    /// `query`. The walk ends when `meta.current_page >= meta.last_page`, or after the
    /// current page when the response has no `meta`. Any failed page fails the whole walk.
    pub async fn request_all_items(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
        query: &Map<String, Value>,
    ) -> ApiResult<Vec<Value>> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let response = self
                .request(method.clone(), endpoint, body, &page_query(query, page))
                .await?;

            let page_data = page_items(&response);
            log::debug!("{endpoint}: page {page} returned {} item(s)", page_data.len());
            items.extend(page_data);

            match next_step(page, &response, self.max_pages) {
                PageStep::Next(next) => page = next,
                PageStep::Done => break,
                PageStep::MissingMeta => {
                    log::warn!("{endpoint}: page {page} has no pagination meta, stopping");
                    break;
                }
                PageStep::LimitReached => return Err(Error::PaginationLimit(self.max_pages)),
            }
        }

        Ok(items)
    }

    /// Upload an attachment as the multipart `file` field of `POST /media/upload`.
    ///
    /// Failures are not classified by status; every error becomes [`Error::UploadFailed`].
    pub async fn upload_media(&self, attachment: &Attachment) -> ApiResult<Value> {
        let url = self.credentials.endpoint_url("/media/upload");
        log::debug!(
            "POST {url} file={} ({} bytes, {})",
            attachment.file_name,
            attachment.bytes.len(),
            attachment.mime_type
        );

        let part = reqwest::multipart::Part::bytes(attachment.bytes.clone())
            .file_name(attachment.file_name.clone())
            .mime_str(&attachment.mime_type)
            .map_err(|e| Error::UploadFailed(format!("Invalid MIME type: {e}")))?;

        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::UploadFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UploadFailed(fallback_status_message(status.as_u16())));
        }

        let text = response
            .text()
            .await
            .map_err(|e| Error::UploadFailed(e.to_string()))?;

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text)
            .map_err(|e| Error::UploadFailed(format!("invalid JSON in response: {e}")))
    }

    /// Connectivity check: `GET /accounts` succeeds
    pub async fn validate_connection(&self) -> bool {
        match self.get("/accounts", &Map::new()).await {
            Ok(_) => true,
            Err(e) => {
                log::debug!("connection check failed: {e}");
                false
            }
        }
    }
}

fn parse_success_body(status: u16, text: &str) -> ApiResult<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(text).map_err(|e| Error::Api {
        status,
        message: format!("Mixpost API Error ({status}): invalid JSON in response: {e}"),
        description: None,
    })
}

/// Flatten a JSON query object into `key=value` pairs; nulls are dropped.
fn query_pairs(query: &Map<String, Value>) -> Vec<(String, String)> {
    query
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                Value::Array(items) => items
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(","),
                other => other.to_string(),
            };
            Some((key.clone(), text))
        })
        .collect()
}
