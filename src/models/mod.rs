//! Model lifecycle
//!
//! Descriptors and progress shapes for installed models, and the list,
//! show, pull, push and delete operations on [`crate::OllamaClient`].

pub mod client;
pub mod types;

pub use types::{
    format_size, is_valid_model_name, ModelDescriptor, ModelDetails, ProgressChunk, ShowResponse,
};
