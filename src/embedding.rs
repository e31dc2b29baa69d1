//! Query embedding via the Generative Language API `embedContent` operation.

use crate::error::{ChatError, ChatResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Embedding model used for query vectors.
pub const EMBEDDING_MODEL: &str = "text-embedding-004";

/// Convert text into a fixed-dimensional vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> ChatResult<Vec<f32>>;
}

/// Gemini embedding client configuration.
#[derive(Debug, Clone)]
pub struct GeminiEmbedderConfig {
    /// API key
    pub api_key: String,
    /// Base URL (default: https://generativelanguage.googleapis.com)
    pub base_url: String,
    /// Embedding model id
    pub model: String,
    /// Request timeout
    pub timeout_secs: u64,
}

impl GeminiEmbedderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: EMBEDDING_MODEL.to_string(),
            timeout_secs: 60,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Hosted embedding client for Gemini `embedContent`.
pub struct GeminiEmbedder {
    client: reqwest::Client,
    config: GeminiEmbedderConfig,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbedValues,
}

#[derive(Debug, Deserialize)]
struct EmbedValues {
    values: Vec<f32>,
}

impl GeminiEmbedder {
    pub fn new(config: GeminiEmbedderConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build reqwest client");
        Self { client, config }
    }

    fn map_error(err: reqwest::Error) -> ChatError {
        if err.is_timeout() {
            ChatError::Embedding(format!("request timed out: {err}"))
        } else if err.is_connect() {
            ChatError::Embedding(format!("connection failed: {err}"))
        } else {
            ChatError::Embedding(err.to_string())
        }
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbedder {
    async fn embed(&self, text: &str) -> ChatResult<Vec<f32>> {
        let url = format!(
            "{}/v1beta/models/{}:embedContent?key={}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
            self.config.api_key
        );

        let body = serde_json::json!({
            "model": format!("models/{}", self.config.model),
            "content": {"parts": [{"text": text}]},
            "taskType": "RETRIEVAL_QUERY",
        });

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(Self::map_error)?;

        let status = resp.status();
        let raw = resp.text().await.map_err(Self::map_error)?;

        if !status.is_success() {
            return Err(ChatError::Embedding(format!(
                "status {}: {}",
                status.as_u16(),
                raw
            )));
        }

        let parsed: EmbedResponse = serde_json::from_str(&raw)
            .map_err(|e| ChatError::Embedding(format!("unexpected response shape: {e}")))?;

        Ok(parsed.embedding.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn embedder(base_url: &str) -> GeminiEmbedder {
        GeminiEmbedder::new(GeminiEmbedderConfig::new("test-key").with_base_url(base_url))
    }

    #[tokio::test]
    async fn embeds_query_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/text-embedding-004:embedContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "content": {"parts": [{"text": "what is a migraine"}]},
                "taskType": "RETRIEVAL_QUERY",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "embedding": {"values": [0.25, -0.5, 1.0]}
            })))
            .mount(&server)
            .await;

        let vector = embedder(&server.uri())
            .embed("what is a migraine")
            .await
            .unwrap();
        assert_eq!(vector, vec![0.25, -0.5, 1.0]);
    }

    #[tokio::test]
    async fn with_model_changes_request_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-embedding-001:embedContent"))
            .and(body_partial_json(json!({
                "model": "models/gemini-embedding-001",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "embedding": {"values": [1.0]}
            })))
            .mount(&server)
            .await;

        let embedder = GeminiEmbedder::new(
            GeminiEmbedderConfig::new("test-key")
                .with_base_url(server.uri())
                .with_model("gemini-embedding-001"),
        );

        let vector = embedder.embed("anything").await.unwrap();
        assert_eq!(vector, vec![1.0]);
    }

    #[tokio::test]
    async fn upstream_error_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let err = embedder(&server.uri()).embed("anything").await.unwrap_err();
        match err {
            ChatError::Embedding(msg) => {
                assert!(msg.contains("400"));
                assert!(msg.contains("API key not valid"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = embedder(&server.uri()).embed("anything").await.unwrap_err();
        assert!(matches!(err, ChatError::Embedding(_)));
    }
}
