//! Request bodies, one struct per endpoint
//!
//! Optional fields are skipped when absent so server defaults apply. The
//! `stream` flag on generate, chat, pull and push requests selects the
//! transport mode for that call.

use crate::errors::{OllamaError, Result};
use crate::types::messages::ChatMessage;
use serde::Serialize;
use serde_json::Value;

fn is_false(value: &bool) -> bool {
    !*value
}

fn require(operation: &'static str, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(OllamaError::client(
            operation,
            format!("{} must not be empty", field),
        ));
    }
    Ok(())
}

/// Body for `POST /api/generate`
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub raw: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
}

impl GenerateRequest {
    /// Streaming request with no optional fields set
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: true,
            system: None,
            template: None,
            context: None,
            options: None,
            format: None,
            raw: false,
            keep_alive: None,
        }
    }

    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Context tokens returned by a previous generate call
    pub fn context(mut self, context: Vec<i64>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn options(mut self, options: Value) -> Self {
        self.options = Some(options);
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    pub fn keep_alive(mut self, keep_alive: impl Into<String>) -> Self {
        self.keep_alive = Some(keep_alive.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        require("generate", "model", &self.model)?;
        require("generate", "prompt", &self.prompt)
    }
}

/// Body for `POST /api/chat`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: true,
            format: None,
            options: None,
            template: None,
            keep_alive: None,
        }
    }

    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn options(mut self, options: Value) -> Self {
        self.options = Some(options);
        self
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn keep_alive(mut self, keep_alive: impl Into<String>) -> Self {
        self.keep_alive = Some(keep_alive.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        require("chat", "model", &self.model)
    }
}

/// Body for `POST /api/pull`
#[derive(Debug, Clone, Serialize)]
pub struct PullRequest {
    pub name: String,
    pub insecure: bool,
    pub stream: bool,
}

impl PullRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            insecure: false,
            stream: true,
        }
    }

    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        require("pull_model", "name", &self.name)
    }
}

/// Body for `POST /api/push`
#[derive(Debug, Clone, Serialize)]
pub struct PushRequest {
    pub name: String,
    pub insecure: bool,
    pub stream: bool,
}

impl PushRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            insecure: false,
            stream: true,
        }
    }

    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        require("push_model", "name", &self.name)
    }
}

/// Body for `DELETE /api/delete`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteRequest {
    pub name: String,
}

/// Body for `POST /api/show`
#[derive(Debug, Clone, Serialize)]
pub struct ShowRequest {
    pub name: String,
}

/// Body for `POST /api/embeddings`
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingsRequest {
    pub model: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
}

impl EmbeddingsRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            options: None,
            keep_alive: None,
        }
    }

    pub fn options(mut self, options: Value) -> Self {
        self.options = Some(options);
        self
    }

    pub fn keep_alive(mut self, keep_alive: impl Into<String>) -> Self {
        self.keep_alive = Some(keep_alive.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        require("embeddings", "model", &self.model)?;
        require("embeddings", "prompt", &self.prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generate_omits_absent_fields() {
        let value = serde_json::to_value(GenerateRequest::new("llama2", "hi")).unwrap();
        assert_eq!(
            value,
            json!({"model": "llama2", "prompt": "hi", "stream": true})
        );
    }

    #[test]
    fn test_generate_includes_set_fields() {
        let request = GenerateRequest::new("llama2", "hi")
            .stream(false)
            .system("be brief")
            .context(vec![1, 2, 3])
            .options(json!({"temperature": 0.2}))
            .raw(true);
        let value = serde_json::to_value(request).unwrap();
        assert_eq!(value["stream"], json!(false));
        assert_eq!(value["system"], json!("be brief"));
        assert_eq!(value["context"], json!([1, 2, 3]));
        assert_eq!(value["options"]["temperature"], json!(0.2));
        assert_eq!(value["raw"], json!(true));
        assert!(value.get("template").is_none());
        assert!(value.get("keep_alive").is_none());
    }

    #[test]
    fn test_generate_requires_model_and_prompt() {
        assert!(GenerateRequest::new("", "hi").validate().is_err());
        assert!(GenerateRequest::new("llama2", "  ").validate().is_err());
        assert!(GenerateRequest::new("llama2", "hi").validate().is_ok());
    }

    #[test]
    fn test_chat_request_preserves_message_order() {
        let request = ChatRequest::new(
            "llama2",
            vec![
                ChatMessage::system("sys"),
                ChatMessage::user("one"),
                ChatMessage::assistant("two"),
                ChatMessage::user("one"),
            ],
        );
        let value = serde_json::to_value(request).unwrap();
        let contents: Vec<&str> = value["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["content"].as_str().unwrap())
            .collect();
        assert_eq!(contents, vec!["sys", "one", "two", "one"]);
        assert!(value.get("options").is_none());
    }

    #[test]
    fn test_pull_request_shape() {
        let value = serde_json::to_value(PullRequest::new("llama2").insecure(true)).unwrap();
        assert_eq!(
            value,
            json!({"name": "llama2", "insecure": true, "stream": true})
        );
    }

    #[test]
    fn test_embeddings_validation() {
        let err = EmbeddingsRequest::new("nomic-embed-text", "")
            .validate()
            .unwrap_err();
        assert!(matches!(err, OllamaError::Client { operation: "embeddings", .. }));
    }
}
