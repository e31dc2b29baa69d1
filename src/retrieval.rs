//! Retrieval contracts and the embed-then-search composition.

use crate::embedding::EmbeddingProvider;
use crate::error::ChatResult;
use async_trait::async_trait;
use std::sync::Arc;

/// One passage returned from similarity search, best-first ordering preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPassage {
    pub id: String,
    pub text: String,
    pub score: f32,
}

impl ScoredPassage {
    pub fn new(id: impl Into<String>, text: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            score,
        }
    }
}

/// Nearest-neighbor lookup over an existing remote index.
///
/// The similarity metric is whatever the index itself was created with; the
/// caller only chooses how many passages to bring back.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn query(&self, embedding: &[f32], top_k: usize) -> ChatResult<Vec<ScoredPassage>>;
}

/// Query-text-in, passages-out seam in front of the embedding step.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str, top_k: usize) -> ChatResult<Vec<ScoredPassage>>;
}

/// Production retriever: embed the query, then search the index with the
/// resulting vector. No re-ranking, filtering, or thresholding happens here.
pub struct IndexRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl IndexRetriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }
}

#[async_trait]
impl Retriever for IndexRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> ChatResult<Vec<ScoredPassage>> {
        let embedding = self.embedder.embed(query).await?;
        self.index.query(&embedding, top_k).await
    }
}
