//! The retrieval-augmented answer chain.

use crate::error::ChatResult;
use crate::llm::ChatModel;
use crate::prompt::{build_prompt, render_context};
use crate::retrieval::Retriever;
use std::sync::Arc;
use tracing::debug;

/// Number of passages requested from the index for every query.
pub const TOP_K: usize = 3;

/// End-to-end chain: retrieve context for a message, fill the prompt
/// template, generate the answer.
#[derive(Clone)]
pub struct RagChain {
    retriever: Arc<dyn Retriever>,
    model: Arc<dyn ChatModel>,
}

impl RagChain {
    pub fn new(retriever: Arc<dyn Retriever>, model: Arc<dyn ChatModel>) -> Self {
        Self { retriever, model }
    }

    /// Answer one user message.
    ///
    /// Retrieval and generation run sequentially; the raw message itself
    /// reaches the prompt untouched. Nothing here retries, so the first
    /// failure from either side propagates as-is.
    pub async fn answer(&self, message: &str) -> ChatResult<String> {
        let passages = self.retriever.retrieve(message, TOP_K).await?;
        debug!(passages = passages.len(), "context retrieved");

        let prompt = build_prompt(&render_context(&passages), message);
        self.model.generate(&prompt).await
    }
}
