use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::AdminConfig;
use crate::error::{AdminError, Result};

/// One backend call, described independently of the HTTP stack.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base, starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    /// Bearer credential; filled in by the client, never by callers.
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| AdminError::Decode(format!("failed to encode request body: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json_body(status: u16, value: serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            AdminError::Decode(format!("{} (body={})", e, truncate_for_error(&self.body)))
        })
    }

    /// The backend's `message` field. Validation failures send a list of
    /// messages, which are joined.
    pub fn error_message(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(&self.body).ok()?;
        match value.get("message")? {
            serde_json::Value::String(message) if !message.is_empty() => Some(message.clone()),
            serde_json::Value::Array(items) => {
                let joined = items
                    .iter()
                    .filter_map(|item| item.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                (!joined.is_empty()).then_some(joined)
            }
            _ => None,
        }
    }
}

/// The wire underneath [`ApiClient`](super::ApiClient).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// reqwest-backed transport talking to the configured base URL.
pub struct HttpTransport {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &AdminConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AdminError::Network(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url().to_string(),
            timeout: config.timeout(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self.http.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = request.body.as_ref() {
            builder = builder.json(body);
        }
        if let Some(token) = request.bearer.as_ref() {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                AdminError::Network(format!(
                    "{} {} timed out after {:?}",
                    request.method, url, self.timeout
                ))
            } else {
                AdminError::Network(format!("{} {} failed: {}", request.method, url, e))
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AdminError::Network(format!("failed to read response body: {}", e)))?;

        Ok(ApiResponse { status, body })
    }
}

fn truncate_for_error(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() <= MAX {
        body.to_string()
    } else {
        let head: String = body.chars().take(MAX).collect();
        format!("{}...", head)
    }
}
