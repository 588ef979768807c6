//! Response decoding, one function per endpoint
//!
//! The endpoint that was called decides the target shape; payloads are not
//! self-describing. Every function fails with [`OllamaError::Client`]
//! naming the operation. Streams use the same functions and drop values
//! that fail.

use crate::errors::{OllamaError, Result};
use crate::models::types::{ListModelsResponse, ModelDescriptor, ProgressChunk, ShowResponse};
use crate::types::responses::{ChatResponse, EmbeddingsResponse, GenerateResponse};
use serde::de::DeserializeOwned;
use serde_json::Value;

fn decode_as<T: DeserializeOwned>(operation: &'static str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        OllamaError::client(operation, format!("unexpected response shape: {}", e))
    })
}

/// `/api/tags` body into descriptors, in server order
pub fn tags(value: Value) -> Result<Vec<ModelDescriptor>> {
    let response: ListModelsResponse = decode_as("list_models", value)?;
    if let Some(pos) = response
        .models
        .iter()
        .position(|m| m.resolved_name().is_empty())
    {
        return Err(OllamaError::client(
            "list_models",
            format!("model entry {} has neither `name` nor `model`", pos),
        ));
    }
    Ok(response.models)
}

pub fn show(value: Value) -> Result<ShowResponse> {
    decode_as("show_model", value)
}

pub fn generate(value: Value) -> Result<GenerateResponse> {
    decode_as("generate", value)
}

pub fn chat(value: Value) -> Result<ChatResponse> {
    decode_as("chat", value)
}

pub fn pull_progress(value: Value) -> Result<ProgressChunk> {
    decode_as("pull_model", value)
}

pub fn push_progress(value: Value) -> Result<ProgressChunk> {
    decode_as("push_model", value)
}

pub fn embeddings(value: Value) -> Result<Vec<f64>> {
    let response: EmbeddingsResponse = decode_as("embeddings", value)?;
    Ok(response.embedding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tags_scenario() {
        let models = tags(json!({
            "models": [{
                "name": "llama2",
                "size": 3825819519u64,
                "modified_at": "2024-01-01T00:00:00Z",
                "digest": "abc123"
            }]
        }))
        .unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].resolved_name(), "llama2");
        assert_eq!(models[0].size, 3825819519);
    }

    #[test]
    fn test_tags_missing_models_is_client_error() {
        let err = tags(json!({"items": []})).unwrap_err();
        match err {
            OllamaError::Client { operation, message } => {
                assert_eq!(operation, "list_models");
                assert!(message.contains("models"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_tags_rejects_nameless_entry() {
        let err = tags(json!({
            "models": [{"size": 1, "modified_at": "", "digest": "d"}]
        }))
        .unwrap_err();
        assert!(matches!(err, OllamaError::Client { .. }));
    }

    #[test]
    fn test_show_all_optional() {
        let info = show(json!({})).unwrap();
        assert_eq!(info, ShowResponse::default());

        let info = show(json!({
            "modelfile": "FROM llama2",
            "details": {"family": "llama", "parameter_size": "7B"},
            "model_info": {"general.architecture": "llama"}
        }))
        .unwrap();
        assert_eq!(info.modelfile.as_deref(), Some("FROM llama2"));
        assert_eq!(info.details.unwrap().family.as_deref(), Some("llama"));
        assert!(info.model_info.unwrap().contains_key("general.architecture"));
    }

    #[test]
    fn test_progress_names_operation() {
        let err = push_progress(json!({"digest": "x"})).unwrap_err();
        assert!(matches!(err, OllamaError::Client { operation: "push_model", .. }));
    }

    #[test]
    fn test_embeddings() {
        assert_eq!(
            embeddings(json!({"embedding": [0.5, -1.0, 2]})).unwrap(),
            vec![0.5, -1.0, 2.0]
        );
        assert!(embeddings(json!({"embedding": "nope"})).is_err());
    }
}
