//! Request and response types for the generation endpoints
//!
//! Model management shapes live in [`crate::models::types`].

pub mod messages;
pub mod requests;
pub mod responses;

pub use messages::{ChatMessage, Role};
pub use requests::{
    ChatRequest, DeleteRequest, EmbeddingsRequest, GenerateRequest, PullRequest, PushRequest,
    ShowRequest,
};
pub use responses::{ChatResponse, EmbeddingsResponse, GenerateResponse, GenerationMetrics};
