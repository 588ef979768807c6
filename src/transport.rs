//! HTTP transport
//!
//! Owns one reqwest client bound to a base URL, timeout and TLS setting.
//! Sends unary and NDJSON streaming requests and maps every failure into
//! the [`OllamaError`] taxonomy.

use crate::errors::{OllamaError, Result};
use crate::profile::ConnectionProfile;
use crate::streaming::{self, RawStream};
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use std::error::Error as StdError;
use std::time::Duration;

/// Default request timeout (120 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// One server capability: operation name, HTTP method and path
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub operation: &'static str,
    pub method: Method,
    pub path: &'static str,
}

impl Endpoint {
    pub const ROOT: Endpoint = Endpoint::new("health_check", Method::GET, "/");
    pub const TAGS: Endpoint = Endpoint::new("list_models", Method::GET, "/api/tags");
    pub const SHOW: Endpoint = Endpoint::new("show_model", Method::POST, "/api/show");
    pub const PULL: Endpoint = Endpoint::new("pull_model", Method::POST, "/api/pull");
    pub const PUSH: Endpoint = Endpoint::new("push_model", Method::POST, "/api/push");
    pub const DELETE: Endpoint = Endpoint::new("delete_model", Method::DELETE, "/api/delete");
    pub const GENERATE: Endpoint = Endpoint::new("generate", Method::POST, "/api/generate");
    pub const CHAT: Endpoint = Endpoint::new("chat", Method::POST, "/api/chat");
    pub const EMBEDDINGS: Endpoint =
        Endpoint::new("embeddings", Method::POST, "/api/embeddings");

    const fn new(operation: &'static str, method: Method, path: &'static str) -> Self {
        Self {
            operation,
            method,
            path,
        }
    }
}

/// Connection context for a single server
#[derive(Debug)]
pub struct Transport {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl Transport {
    /// Build the HTTP client for `profile`
    pub fn new(profile: &ConnectionProfile, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(timeout)
            .danger_accept_invalid_certs(!profile.verify_tls())
            .build()
            .map_err(|e| OllamaError::client("connect", error_chain(&e)))?;

        Ok(Self {
            http,
            base_url: profile.base_url(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send and parse the whole body as one JSON value
    pub async fn request_unary(&self, endpoint: &Endpoint, body: Option<&Value>) -> Result<Value> {
        let response = self.send(endpoint, body, false).await?;
        let bytes = self.read_body(response).await?;

        serde_json::from_slice(&bytes).map_err(|e| {
            OllamaError::client(endpoint.operation, format!("response is not valid JSON: {}", e))
        })
    }

    /// Send and discard the response body
    pub async fn request_empty(&self, endpoint: &Endpoint, body: Option<&Value>) -> Result<()> {
        self.send(endpoint, body, false).await?;
        Ok(())
    }

    /// Open a streaming request and read its body as NDJSON
    pub async fn request_stream(&self, endpoint: &Endpoint, body: &Value) -> Result<RawStream> {
        let response = self.send(endpoint, Some(body), true).await?;
        Ok(streaming::ndjson(
            response.bytes_stream(),
            self.base_url.clone(),
            self.timeout,
        ))
    }

    async fn send(&self, endpoint: &Endpoint, body: Option<&Value>, stream: bool) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint.path);
        tracing::debug!(
            operation = endpoint.operation,
            method = %endpoint.method,
            url = %url,
            stream,
            "sending request"
        );

        let mut request = self.http.request(endpoint.method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| self.timed_out())?
            .map_err(|e| self.map_send_error(endpoint, e))?;

        let status = response.status();
        tracing::debug!(operation = endpoint.operation, status = status.as_u16(), "response received");

        if !status.is_success() {
            return Err(self.api_error(status, response).await);
        }

        Ok(response)
    }

    async fn read_body(&self, response: Response) -> Result<bytes::Bytes> {
        tokio::time::timeout(self.timeout, response.bytes())
            .await
            .map_err(|_| self.timed_out())?
            .map_err(|e| OllamaError::connection(&self.base_url, error_chain(&e)))
    }

    /// Build an API error from a non-2xx response
    async fn api_error(&self, status: StatusCode, response: Response) -> OllamaError {
        let body = tokio::time::timeout(self.timeout, response.bytes()).await;
        let message = match body {
            Ok(Ok(bytes)) => error_message(&bytes),
            _ => None,
        };

        OllamaError::Api {
            status: status.as_u16(),
            message: message.unwrap_or_else(|| format!("API error: {}", status.as_u16())),
        }
    }

    fn map_send_error(&self, endpoint: &Endpoint, err: reqwest::Error) -> OllamaError {
        if err.is_builder() {
            return OllamaError::client(endpoint.operation, error_chain(&err));
        }
        if err.is_timeout() {
            return self.timed_out();
        }
        OllamaError::connection(&self.base_url, error_chain(&err))
    }

    fn timed_out(&self) -> OllamaError {
        OllamaError::connection(
            &self.base_url,
            format!("request timed out after {}s", self.timeout.as_secs()),
        )
    }
}

/// The `error` string of a JSON error body
fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value.get("error")?.as_str().map(str::to_string)
}

/// Display an error with its source chain
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
