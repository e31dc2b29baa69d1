//! Pinecone REST client.
//!
//! Two API surfaces are involved: the control plane resolves an index name to
//! its data-plane host, and the data plane answers similarity queries. The
//! client only reads; it never creates, populates, or deletes an index.

use crate::error::{ChatError, ChatResult};
use crate::retrieval::{ScoredPassage, VectorIndex};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Control-plane endpoint for index description.
const CONTROL_PLANE_URL: &str = "https://api.pinecone.io";
/// REST API version pinned on every request.
const API_VERSION: &str = "2025-01";
/// Metadata key under which the ingestion pipeline stored passage text.
const TEXT_METADATA_KEY: &str = "text";

/// Configuration for connecting to one existing Pinecone index.
#[derive(Debug, Clone)]
pub struct PineconeConfig {
    /// API key
    pub api_key: String,
    /// Name of the index to resolve
    pub index_name: String,
    /// Control-plane base URL (default: https://api.pinecone.io)
    pub control_plane_url: String,
    /// Request timeout
    pub timeout_secs: u64,
}

impl PineconeConfig {
    pub fn new(api_key: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            index_name: index_name.into(),
            control_plane_url: CONTROL_PLANE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    pub fn with_control_plane_url(mut self, url: impl Into<String>) -> Self {
        self.control_plane_url = url.into();
        self
    }
}

/// Client bound to one index's data-plane host.
#[derive(Debug)]
pub struct PineconeIndex {
    client: reqwest::Client,
    api_key: String,
    /// Fully qualified data-plane endpoint, scheme included.
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct DescribeIndexResponse {
    host: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    metadata: Option<serde_json::Value>,
}

/// Control-plane hosts come back bare (`index-xyz.svc.region.pinecone.io`);
/// data-plane traffic is always TLS unless the host already names a scheme.
fn host_to_endpoint(host: &str) -> String {
    if host.contains("://") {
        host.trim_end_matches('/').to_string()
    } else {
        format!("https://{host}")
    }
}

/// Extract a passage from one query match. Passage text lives under the
/// `text` metadata key; a match without it yields an empty passage.
fn match_to_passage(m: &QueryMatch) -> ScoredPassage {
    let text = m
        .metadata
        .as_ref()
        .and_then(|meta| meta.get(TEXT_METADATA_KEY))
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    ScoredPassage {
        id: m.id.clone(),
        text,
        score: m.score,
    }
}

impl PineconeIndex {
    /// Resolve `config.index_name` through the control plane and return a
    /// client bound to the index's data-plane host.
    ///
    /// The index must already exist; an unknown name surfaces as the control
    /// plane's 404.
    pub async fn connect(config: PineconeConfig) -> ChatResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build reqwest client");

        let url = format!(
            "{}/indexes/{}",
            config.control_plane_url.trim_end_matches('/'),
            config.index_name
        );

        let resp = client
            .get(&url)
            .header("Api-Key", &config.api_key)
            .header("X-Pinecone-Api-Version", API_VERSION)
            .send()
            .await
            .map_err(Self::map_error)?;

        let status = resp.status();
        let raw = resp.text().await.map_err(Self::map_error)?;

        if !status.is_success() {
            return Err(ChatError::Index(format!(
                "describe index '{}' returned status {}: {}",
                config.index_name,
                status.as_u16(),
                raw
            )));
        }

        let parsed: DescribeIndexResponse = serde_json::from_str(&raw)
            .map_err(|e| ChatError::Index(format!("unexpected describe response: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key,
            endpoint: host_to_endpoint(&parsed.host),
        })
    }

    /// Build a client directly against a known data-plane endpoint, skipping
    /// the control-plane lookup.
    pub fn with_endpoint(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build reqwest client");
        Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    /// The resolved data-plane endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_error(err: reqwest::Error) -> ChatError {
        if err.is_timeout() {
            ChatError::Index(format!("request timed out: {err}"))
        } else if err.is_connect() {
            ChatError::Index(format!("connection failed: {err}"))
        } else {
            ChatError::Index(err.to_string())
        }
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn query(&self, embedding: &[f32], top_k: usize) -> ChatResult<Vec<ScoredPassage>> {
        debug!(top_k, "querying pinecone index");

        let body = serde_json::json!({
            "vector": embedding,
            "topK": top_k,
            "includeMetadata": true,
            "includeValues": false,
        });

        let resp = self
            .client
            .post(format!("{}/query", self.endpoint))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-Api-Version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(Self::map_error)?;

        let status = resp.status();
        let raw = resp.text().await.map_err(Self::map_error)?;

        if !status.is_success() {
            return Err(ChatError::Index(format!(
                "query returned status {}: {}",
                status.as_u16(),
                raw
            )));
        }

        let parsed: QueryResponse = serde_json::from_str(&raw)
            .map_err(|e| ChatError::Index(format!("unexpected query response: {e}")))?;

        Ok(parsed.matches.iter().map(match_to_passage).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn bare_host_gets_https_scheme() {
        assert_eq!(
            host_to_endpoint("idx-abc.svc.aped-4627.pinecone.io"),
            "https://idx-abc.svc.aped-4627.pinecone.io"
        );
    }

    #[test]
    fn schemed_host_is_kept() {
        assert_eq!(
            host_to_endpoint("http://127.0.0.1:8099/"),
            "http://127.0.0.1:8099"
        );
    }

    #[test]
    fn match_text_read_from_metadata() {
        let m = QueryMatch {
            id: "p1".to_string(),
            score: 0.87,
            metadata: Some(json!({"text": "Aspirin is an NSAID.", "source": "book.pdf"})),
        };
        let passage = match_to_passage(&m);
        assert_eq!(passage.id, "p1");
        assert_eq!(passage.text, "Aspirin is an NSAID.");
        assert_eq!(passage.score, 0.87);
    }

    #[test]
    fn match_without_text_metadata_is_empty() {
        let m = QueryMatch {
            id: "p2".to_string(),
            score: 0.5,
            metadata: None,
        };
        assert_eq!(match_to_passage(&m).text, "");
    }

    #[tokio::test]
    async fn connect_resolves_data_plane_host() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/medical-chatbot"))
            .and(header("Api-Key", "pc-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "medical-chatbot",
                "dimension": 768,
                "metric": "cosine",
                "host": "medical-chatbot-abc.svc.aped-4627.pinecone.io",
                "status": {"ready": true, "state": "Ready"}
            })))
            .mount(&server)
            .await;

        let index = PineconeIndex::connect(
            PineconeConfig::new("pc-key", "medical-chatbot")
                .with_control_plane_url(server.uri()),
        )
        .await
        .unwrap();

        assert_eq!(
            index.endpoint(),
            "https://medical-chatbot-abc.svc.aped-4627.pinecone.io"
        );
    }

    #[tokio::test]
    async fn connect_reports_unknown_index() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404).set_body_string(r#"{"error":"Resource not found"}"#),
            )
            .mount(&server)
            .await;

        let err = PineconeIndex::connect(
            PineconeConfig::new("pc-key", "no-such-index").with_control_plane_url(server.uri()),
        )
        .await
        .unwrap_err();

        match err {
            ChatError::Index(msg) => {
                assert!(msg.contains("no-such-index"));
                assert!(msg.contains("404"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn query_returns_scored_passages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(header("Api-Key", "pc-key"))
            .and(body_partial_json(json!({
                "topK": 3,
                "includeMetadata": true,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "matches": [
                    {"id": "a", "score": 0.9, "metadata": {"text": "first"}},
                    {"id": "b", "score": 0.8, "metadata": {"text": "second"}},
                    {"id": "c", "score": 0.7, "metadata": {"text": "third"}}
                ],
                "namespace": "",
                "usage": {"readUnits": 6}
            })))
            .mount(&server)
            .await;

        let index = PineconeIndex::with_endpoint("pc-key", server.uri());
        let passages = index.query(&[0.25, -0.5, 1.0], 3).await.unwrap();

        assert_eq!(passages.len(), 3);
        assert_eq!(passages[0], ScoredPassage::new("a", "first", 0.9));
        assert_eq!(passages[2].text, "third");
    }

    #[tokio::test]
    async fn query_error_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let index = PineconeIndex::with_endpoint("pc-key", server.uri());
        let err = index.query(&[0.1], 3).await.unwrap_err();

        match err {
            ChatError::Index(msg) => assert!(msg.contains("500")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
