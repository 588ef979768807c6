//! Model lifecycle operations
//!
//! List, show, pull, push and delete, implemented on [`OllamaClient`].

use crate::client::{to_body, warn_on_model_name, OllamaClient};
use crate::decode;
use crate::errors::{OllamaError, Result};
use crate::models::types::{ModelDescriptor, ProgressChunk, ShowResponse};
use crate::streaming::Reply;
use crate::transport::Endpoint;
use crate::types::{DeleteRequest, PullRequest, PushRequest, ShowRequest};

impl OllamaClient {
    /// List all installed models
    ///
    /// Calls GET /api/tags. Order is the server's.
    pub async fn list_models(&self) -> Result<Vec<ModelDescriptor>> {
        let value = self
            .transport()
            .request_unary(&Endpoint::TAGS, None)
            .await?;
        decode::tags(value)
    }

    /// Get detailed information about a specific model
    ///
    /// Calls POST /api/show with model name
    pub async fn show_model(&self, name: &str) -> Result<ShowResponse> {
        require_name(&Endpoint::SHOW, name)?;
        let body = to_body(&Endpoint::SHOW, &ShowRequest { name: name.to_string() })?;
        let value = self
            .transport()
            .request_unary(&Endpoint::SHOW, Some(&body))
            .await?;
        decode::show(value)
    }

    /// Pull (download) a model from the registry
    ///
    /// With `request.stream` set, progress arrives as a stream of chunks
    /// ending with status "success"; otherwise only the final status.
    pub async fn pull_model(&self, request: PullRequest) -> Result<Reply<ProgressChunk>> {
        request.validate()?;
        warn_on_model_name(&request.name);
        self.dual(&Endpoint::PULL, &request, request.stream, decode::pull_progress)
            .await
    }

    /// Push a model to the registry
    pub async fn push_model(&self, request: PushRequest) -> Result<Reply<ProgressChunk>> {
        request.validate()?;
        warn_on_model_name(&request.name);
        self.dual(&Endpoint::PUSH, &request, request.stream, decode::push_progress)
            .await
    }

    /// Delete a model
    ///
    /// Calls DELETE /api/delete. Success means the server returned 2xx.
    pub async fn delete_model(&self, name: &str) -> Result<()> {
        require_name(&Endpoint::DELETE, name)?;
        let body = to_body(&Endpoint::DELETE, &DeleteRequest { name: name.to_string() })?;
        self.transport()
            .request_empty(&Endpoint::DELETE, Some(&body))
            .await
    }
}

fn require_name(endpoint: &Endpoint, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(OllamaError::client(
            endpoint.operation,
            "model name must not be empty",
        ));
    }
    warn_on_model_name(name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ConnectionProfile;

    fn offline_client() -> OllamaClient {
        OllamaClient::new(ConnectionProfile::new("127.0.0.1").with_port(9)).unwrap()
    }

    #[tokio::test]
    async fn test_show_empty_name() {
        let err = offline_client().show_model("").await.unwrap_err();
        assert!(matches!(err, OllamaError::Client { operation: "show_model", .. }));
    }

    #[tokio::test]
    async fn test_delete_empty_name() {
        let err = offline_client().delete_model(" ").await.unwrap_err();
        assert!(matches!(err, OllamaError::Client { operation: "delete_model", .. }));
    }

    #[tokio::test]
    async fn test_pull_empty_name() {
        let err = offline_client()
            .pull_model(PullRequest::new(""))
            .await
            .unwrap_err();
        assert!(matches!(err, OllamaError::Client { operation: "pull_model", .. }));
    }
}
