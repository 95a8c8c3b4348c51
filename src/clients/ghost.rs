//! Ghost Admin API transport: one signed request per call, uniform error
//! mapping, `204` treated as an empty object.

use std::time::Instant;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};

use crate::clients::admin_key::AdminKey;
use crate::core::GhostError;
use crate::infra::http::headers::add_standard_headers;
use crate::infra::runtime::limits::make_http_client;

/// Path prefix of the Admin API below the site URL.
pub const ADMIN_API_PATH: &str = "/ghost/api/admin";

/// A file to send as multipart form data.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(Value),
    File(FilePart),
}

/// One Admin API call, relative to the API root.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<RequestBody>,
    headers: HeaderMap,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn file(mut self, part: FilePart) -> Self {
        self.body = Some(RequestBody::File(part));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    fn carries_file(&self) -> bool {
        matches!(self.body, Some(RequestBody::File(_)))
    }
}

/// Shared Admin API client. Cheap to share behind an `Arc`; holds no
/// mutable state.
#[derive(Debug, Clone)]
pub struct GhostClient {
    base: String,
    key: AdminKey,
    http: Client,
}

impl GhostClient {
    pub fn new(site_url: &str, key: AdminKey) -> Result<Self, GhostError> {
        let http = make_http_client()?;
        Ok(Self::with_http(site_url, key, http))
    }

    pub fn with_http(site_url: &str, key: AdminKey, http: Client) -> Self {
        Self {
            base: format!("{}{ADMIN_API_PATH}", site_url.trim_end_matches('/')),
            key,
            http,
        }
    }

    /// Absolute Admin API root, e.g. `https://blog.example/ghost/api/admin`.
    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    pub async fn send(&self, req: ApiRequest) -> Result<Value, GhostError> {
        let url = self.url_for(&req.path);
        let json = !req.carries_file();
        let token = self.key.token();
        let (mut builder, rid) =
            add_standard_headers(self.http.request(req.method.clone(), &url), &token, json, None);
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        builder = builder.headers(req.headers);
        builder = match req.body {
            Some(RequestBody::Json(v)) => builder.json(&v),
            Some(RequestBody::File(f)) => {
                let part = reqwest::multipart::Part::bytes(f.bytes)
                    .file_name(f.file_name)
                    .mime_str(&f.mime)?;
                builder.multipart(reqwest::multipart::Form::new().part(f.field, part))
            }
            None => builder,
        };

        tracing::debug!(method = %req.method, path = %req.path, request_id = %rid, "ghost api request");
        let start = Instant::now();
        let result = builder.send().await;
        let elapsed_ms = start.elapsed().as_millis() as f64;

        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(method = %req.method, path = %req.path, request_id = %rid, error = %e, "ghost api transport failure");
                metrics::counter!("ghost_api_requests_total", "method" => req.method.to_string(), "status" => "error").increment(1);
                return Err(e.into());
            }
        };
        let status = resp.status();
        tracing::debug!(method = %req.method, path = %req.path, status = status.as_u16(), elapsed_ms, "ghost api response");
        metrics::counter!("ghost_api_requests_total", "method" => req.method.to_string(), "status" => status.as_u16().to_string()).increment(1);
        crate::infra::logging::log_metric("ghost.api", "ghost_api_latency_ms", elapsed_ms);

        if status.as_u16() >= 400 {
            let text = match resp.text().await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(method = %req.method, path = %req.path, request_id = %rid, status = status.as_u16(), error = %e, "failed to read ghost api error body");
                    String::new()
                }
            };
            return Err(GhostError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(json!({}));
        }
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, GhostError> {
        let req = query
            .iter()
            .fold(ApiRequest::get(path), |r, (k, v)| r.query(*k, v));
        self.send(req).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value, GhostError> {
        self.send(ApiRequest::post(path).json(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<Value, GhostError> {
        self.send(ApiRequest::put(path).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, GhostError> {
        self.send(ApiRequest::delete(path)).await
    }

    pub async fn upload(&self, path: &str, file: FilePart) -> Result<Value, GhostError> {
        self.send(ApiRequest::post(path).file(file)).await
    }
}

/// `errors[0].message` from a Ghost error body, else the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/errors/0/message")
                .and_then(|m| m.as_str())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| body.to_string())
}
