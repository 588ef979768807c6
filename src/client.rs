//! Ollama API client
//!
//! [`OllamaClient`] owns one [`Transport`] and exposes one async method per
//! server capability. Generation operations live here; model lifecycle
//! operations are in [`crate::models::client`].

use crate::decode;
use crate::errors::{OllamaError, Result};
use crate::profile::ConnectionProfile;
use crate::streaming::{ChunkStream, Decoder, Reply, StreamChunk};
use crate::transport::{Endpoint, Transport, DEFAULT_TIMEOUT};
use crate::types::{ChatRequest, ChatResponse, EmbeddingsRequest, GenerateRequest, GenerateResponse};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Client bound to a single Ollama server
///
/// At most one request is expected in flight at a time. Dropping the
/// client (or calling [`OllamaClient::close`]) releases its connections.
#[derive(Debug)]
pub struct OllamaClient {
    profile: ConnectionProfile,
    transport: Transport,
}

impl OllamaClient {
    /// Create client with the default timeout
    pub fn new(profile: ConnectionProfile) -> Result<Self> {
        Self::with_timeout(profile, DEFAULT_TIMEOUT)
    }

    /// Create client with a custom timeout applied to connecting, waiting
    /// for headers, and every body read
    pub fn with_timeout(profile: ConnectionProfile, timeout: Duration) -> Result<Self> {
        let transport = Transport::new(&profile, timeout)?;
        tracing::debug!(base_url = transport.base_url(), timeout_secs = timeout.as_secs(), "client created");

        Ok(Self { profile, transport })
    }

    pub fn profile(&self) -> &ConnectionProfile {
        &self.profile
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub fn timeout(&self) -> Duration {
        self.transport.timeout()
    }

    /// Release the connection pool
    pub fn close(self) {
        tracing::debug!(base_url = self.base_url(), "client closed");
    }

    pub(crate) fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Generate a completion for a single prompt
    pub async fn generate(&self, request: GenerateRequest) -> Result<Reply<GenerateResponse>> {
        request.validate()?;
        warn_on_model_name(&request.model);
        self.dual(&Endpoint::GENERATE, &request, request.stream, decode::generate)
            .await
    }

    /// Continue a conversation
    pub async fn chat(&self, request: ChatRequest) -> Result<Reply<ChatResponse>> {
        request.validate()?;
        warn_on_model_name(&request.model);
        self.dual(&Endpoint::CHAT, &request, request.stream, decode::chat)
            .await
    }

    /// Embedding vector for a prompt
    pub async fn embeddings(&self, request: EmbeddingsRequest) -> Result<Vec<f64>> {
        request.validate()?;
        warn_on_model_name(&request.model);
        let body = to_body(&Endpoint::EMBEDDINGS, &request)?;
        let value = self
            .transport
            .request_unary(&Endpoint::EMBEDDINGS, Some(&body))
            .await?;
        decode::embeddings(value)
    }

    /// Whether the server answers `GET /` with a 2xx status
    ///
    /// Never fails; every error becomes `false`.
    pub async fn health_check(&self) -> bool {
        match self.transport.request_empty(&Endpoint::ROOT, None).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "health check failed");
                false
            }
        }
    }

    /// Run `endpoint` unary or streaming depending on `stream`
    pub(crate) async fn dual<B, T>(
        &self,
        endpoint: &Endpoint,
        request: &B,
        stream: bool,
        decode: Decoder<T>,
    ) -> Result<Reply<T>>
    where
        B: Serialize,
        T: StreamChunk + Send + 'static,
    {
        let body = to_body(endpoint, request)?;
        if stream {
            let raw = self.transport.request_stream(endpoint, &body).await?;
            Ok(Reply::Stream(ChunkStream::new(raw, decode, self.base_url())))
        } else {
            let value = self.transport.request_unary(endpoint, Some(&body)).await?;
            decode(value).map(Reply::Unary)
        }
    }
}

pub(crate) fn to_body<B: Serialize>(endpoint: &Endpoint, request: &B) -> Result<Value> {
    serde_json::to_value(request).map_err(|e| {
        OllamaError::client(endpoint.operation, format!("failed to encode request: {}", e))
    })
}

pub(crate) fn warn_on_model_name(name: &str) {
    if !crate::models::types::is_valid_model_name(name) {
        tracing::warn!(model = name, "model name does not match the expected pattern; sending anyway");
    }
}
