//! ollamactl - Ollama client library and CLI
//!
//! A typed async client for the Ollama HTTP API with streaming and
//! non-streaming modes, plus the configuration, host discovery and
//! terminal layers used by the `ollamactl` binary.
//!
//! # Architecture
//!
//! - **Core**: connection profiles, transport, NDJSON streaming, decoding
//! - **API**: [`OllamaClient`] with generation and model lifecycle operations
//! - **CLI**: TOML configuration, MCP host import, commands and chat REPL

// Core client
pub mod errors;
pub mod profile;
pub mod types;
pub mod streaming;
pub mod transport;
pub mod decode;
pub mod client;
pub mod models;

// Re-export commonly used types
pub use client::OllamaClient;
pub use errors::{ConfigError, OllamaError, Result};
pub use profile::{ConnectionProfile, Scheme};
pub use streaming::{ChunkStream, Reply};

// Configuration and host discovery
pub mod config;
pub mod mcp;

// Terminal interface
pub mod cli;
pub mod logging;
pub mod repl;
