//! Error types for ollamactl
//!
//! Every client operation fails with exactly one [`OllamaError`] kind.
//! Configuration loading has its own [`ConfigError`] so the core taxonomy
//! stays flat.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a request against an Ollama server
#[derive(Error, Debug)]
pub enum OllamaError {
    /// Network unreachable, DNS failure, refused connection, timeout, or a
    /// stream that ended before its terminal chunk
    #[error("Connection to Ollama server at {base_url} failed: {message}")]
    Connection { base_url: String, message: String },

    /// Server answered with a non-2xx status
    #[error("Ollama API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Local invariant violated (undecodable body, invalid request)
    #[error("{operation} failed: {message}")]
    Client {
        operation: &'static str,
        message: String,
    },
}

impl OllamaError {
    pub(crate) fn connection(base_url: &str, message: impl Into<String>) -> Self {
        OllamaError::Connection {
            base_url: base_url.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn client(operation: &'static str, message: impl Into<String>) -> Self {
        OllamaError::Client {
            operation,
            message: message.into(),
        }
    }

    /// HTTP status for API errors
    pub fn status(&self) -> Option<u16> {
        match self {
            OllamaError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, OllamaError>;

/// Configuration loading and saving errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to write config {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    #[error("Could not determine the user configuration directory")]
    NoConfigDir,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_names_base_url() {
        let err = OllamaError::connection("https://example.com:443", "connection refused");
        let text = err.to_string();
        assert!(text.contains("https://example.com:443"));
        assert!(text.contains("connection refused"));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_api_error_display() {
        let err = OllamaError::Api {
            status: 404,
            message: "model not found".to_string(),
        };
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("model not found"));
    }

    #[test]
    fn test_client_error_names_operation() {
        let err = OllamaError::client("list_models", "missing field `models`");
        assert!(err.to_string().starts_with("list_models"));
    }

    #[test]
    fn test_config_not_found_display() {
        let err = ConfigError::NotFound(PathBuf::from("/tmp/nope.toml"));
        assert!(err.to_string().contains("/tmp/nope.toml"));
    }
}
