//! Generation response shapes
//!
//! The same struct is used for a unary body and for each streamed chunk of
//! the matching endpoint.

use crate::streaming::{StreamChunk, TextFragment};
use crate::types::messages::ChatMessage;
use serde::{Deserialize, Serialize};

/// Timing and token counters reported on the final chunk
///
/// Durations are nanoseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_eval_duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_duration: Option<u64>,
}

impl GenerationMetrics {
    /// Generated tokens per second, when the server reported both counters
    pub fn tokens_per_second(&self) -> Option<f64> {
        match (self.eval_count, self.eval_duration) {
            (Some(count), Some(duration)) if duration > 0 => {
                Some(count as f64 / (duration as f64 / 1_000_000_000.0))
            }
            _ => None,
        }
    }
}

/// Response (or chunk) from `/api/generate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub created_at: String,
    pub response: String,
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<i64>>,
    #[serde(flatten)]
    pub metrics: GenerationMetrics,
}

impl StreamChunk for GenerateResponse {
    fn is_terminal(&self) -> bool {
        self.done
    }
}

impl TextFragment for GenerateResponse {
    fn fragment(&self) -> &str {
        &self.response
    }
}

/// Response (or chunk) from `/api/chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub created_at: String,
    pub message: ChatMessage,
    pub done: bool,
    #[serde(flatten)]
    pub metrics: GenerationMetrics,
}

impl StreamChunk for ChatResponse {
    fn is_terminal(&self) -> bool {
        self.done
    }
}

impl TextFragment for ChatResponse {
    fn fragment(&self) -> &str {
        &self.message.content
    }
}

/// Body of `/api/embeddings`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmbeddingsResponse {
    pub embedding: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::messages::Role;
    use serde_json::json;

    #[test]
    fn test_generate_final_chunk_with_metrics() {
        let chunk: GenerateResponse = serde_json::from_value(json!({
            "model": "llama2",
            "created_at": "2024-01-01T00:00:00Z",
            "response": "",
            "done": true,
            "context": [1, 2],
            "eval_count": 20,
            "eval_duration": 2_000_000_000u64
        }))
        .unwrap();
        assert!(chunk.is_terminal());
        assert_eq!(chunk.context, Some(vec![1, 2]));
        assert_eq!(chunk.metrics.tokens_per_second(), Some(10.0));
        assert_eq!(chunk.metrics.total_duration, None);
    }

    #[test]
    fn test_generate_minimal_chunk() {
        let chunk: GenerateResponse =
            serde_json::from_value(json!({"response": "Hel", "done": false})).unwrap();
        assert_eq!(chunk.fragment(), "Hel");
        assert!(chunk.model.is_empty());
        assert!(!chunk.is_terminal());
    }

    #[test]
    fn test_generate_missing_done() {
        let result: Result<GenerateResponse, _> = serde_json::from_value(json!({"response": "Hel"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_chat_minimal_chunk() {
        let chunk: ChatResponse = serde_json::from_value(json!({
            "message": {"role": "assistant", "content": ""},
            "done": true
        }))
        .unwrap();
        assert!(chunk.is_terminal());
        assert!(chunk.created_at.is_empty());
    }

    #[test]
    fn test_chat_chunk_fragment() {
        let chunk: ChatResponse = serde_json::from_value(json!({
            "model": "llama2",
            "created_at": "2024-01-01T00:00:00Z",
            "message": {"role": "assistant", "content": "Hi"},
            "done": false
        }))
        .unwrap();
        assert_eq!(chunk.message.role, Role::Assistant);
        assert_eq!(chunk.fragment(), "Hi");
        assert!(!chunk.is_terminal());
    }

    #[test]
    fn test_tokens_per_second_needs_duration() {
        let metrics = GenerationMetrics {
            eval_count: Some(5),
            eval_duration: Some(0),
            ..Default::default()
        };
        assert_eq!(metrics.tokens_per_second(), None);
    }
}
