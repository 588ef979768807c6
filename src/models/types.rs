//! Type definitions for Ollama model management
//!
//! Shapes returned by `/api/tags`, `/api/show`, `/api/pull` and `/api/push`.

use crate::streaming::StreamChunk;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Information about an installed model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Model name (e.g., "llama3.1:8b")
    #[serde(default)]
    pub name: String,

    /// Alternate name field used by some server versions
    #[serde(default)]
    pub model: String,

    /// Model size in bytes
    pub size: u64,

    /// Server formatted modification time
    pub modified_at: String,

    pub digest: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ModelDetails>,
}

/// Descriptive model metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_model: Option<String>,

    /// Model format (e.g., "gguf")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Model family (e.g., "llama", "qwen2")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub families: Option<Vec<String>>,

    /// Parameter size (e.g., "7B", "13B")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_size: Option<String>,

    /// Quantization level (e.g., "Q4_0", "Q4_K_M")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantization_level: Option<String>,
}

/// Body of `/api/tags`
#[derive(Debug, Deserialize)]
pub struct ListModelsResponse {
    pub models: Vec<ModelDescriptor>,
}

/// Body of `/api/show`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ShowResponse {
    #[serde(default)]
    pub modelfile: Option<String>,

    #[serde(default)]
    pub parameters: Option<String>,

    #[serde(default)]
    pub template: Option<String>,

    #[serde(default)]
    pub details: Option<ModelDetails>,

    #[serde(default)]
    pub model_info: Option<Map<String, Value>>,
}

/// Progress update from a pull or push
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProgressChunk {
    /// Status message
    pub status: String,

    /// Digest of the layer being transferred
    #[serde(default)]
    pub digest: Option<String>,

    /// Total bytes of the current layer
    #[serde(default)]
    pub total: Option<u64>,

    /// Bytes transferred so far
    #[serde(default)]
    pub completed: Option<u64>,

    #[serde(default)]
    pub done: bool,
}

impl ProgressChunk {
    /// Completed fraction in `[0, 1]` when both counters are known
    pub fn fraction(&self) -> Option<f64> {
        match (self.completed, self.total) {
            (Some(completed), Some(total)) if total > 0 => {
                Some((completed as f64 / total as f64).min(1.0))
            }
            _ => None,
        }
    }
}

impl StreamChunk for ProgressChunk {
    fn is_terminal(&self) -> bool {
        self.done || self.status == "success"
    }
}

impl ModelDescriptor {
    /// `name` when present, otherwise `model`
    pub fn resolved_name(&self) -> &str {
        if self.name.is_empty() {
            &self.model
        } else {
            &self.name
        }
    }

    /// Parsed modification time, if the server sent RFC 3339
    pub fn modified_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.modified_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Format the model size in human-readable format
    pub fn formatted_size(&self) -> String {
        format_size(self.size)
    }

    /// Get a short description of the model
    pub fn description(&self) -> String {
        if let Some(ref details) = self.details {
            let parts: Vec<&str> = [&details.parameter_size, &details.quantization_level]
                .into_iter()
                .flatten()
                .map(String::as_str)
                .collect();

            if !parts.is_empty() {
                return parts.join(" ");
            }
        }

        self.formatted_size()
    }
}

impl fmt::Display for ModelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.resolved_name(), self.formatted_size())
    }
}

/// Format bytes into human-readable size
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let base: f64 = 1024.0;
    let exponent = (bytes as f64).log(base).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);

    let size = bytes as f64 / base.powi(exponent as i32);

    format!("{:.2} {}", size, UNITS[exponent])
}

/// Whether `name` looks like an Ollama model reference
///
/// Lowercase letters, digits and `. _ : / -`, compared case-insensitively.
/// The server is authoritative; callers only warn on a mismatch.
pub fn is_valid_model_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| {
            let c = c.to_ascii_lowercase();
            c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | ':' | '/' | '-')
        })
}
