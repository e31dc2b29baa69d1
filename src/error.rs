//! Crate error types.

use thiserror::Error;

/// Errors raised anywhere along the chat pipeline.
///
/// Each variant names the failure origin; the message carries whatever the
/// upstream service or parser reported. Only the HTTP layer turns these into
/// a wire shape.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("missing form field 'msg'")]
    MissingMessage,

    #[error("invalid form body: {0}")]
    InvalidForm(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("embedding request failed: {0}")]
    Embedding(String),

    #[error("vector index error: {0}")]
    Index(String),

    #[error("chat completion failed: {0}")]
    Completion(String),
}

impl ChatError {
    /// Stable short label for structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ChatError::MissingMessage => "missing_message",
            ChatError::InvalidForm(_) => "invalid_form",
            ChatError::Configuration(_) => "configuration",
            ChatError::Embedding(_) => "embedding",
            ChatError::Index(_) => "index",
            ChatError::Completion(_) => "completion",
        }
    }
}

pub type ChatResult<T> = Result<T, ChatError>;
