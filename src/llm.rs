//! Answer generation via the Generative Language API `generateContent`
//! operation.
//!
//! Text-only, non-streaming, no tools. The system instruction travels in
//! `systemInstruction`; the user message is the single `contents` turn.

use crate::error::{ChatError, ChatResult};
use crate::prompt::ChatPrompt;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Chat model used for answer generation.
pub const CHAT_MODEL: &str = "gemini-2.5-flash";

/// Generate an answer from a two-message prompt.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(&self, prompt: &ChatPrompt) -> ChatResult<String>;
}

/// Gemini chat client configuration.
#[derive(Debug, Clone)]
pub struct GeminiChatConfig {
    /// API key
    pub api_key: String,
    /// Base URL (default: https://generativelanguage.googleapis.com)
    pub base_url: String,
    /// Model id
    pub model: String,
    /// Sampling temperature; answers are kept deterministic, so 0.
    pub temperature: f32,
    /// Request timeout
    pub timeout_secs: u64,
}

impl GeminiChatConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: CHAT_MODEL.to_string(),
            temperature: 0.0,
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

/// Gemini chat client (text-only, no tools).
pub struct GeminiChat {
    client: reqwest::Client,
    config: GeminiChatConfig,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiChat {
    pub fn new(config: GeminiChatConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build reqwest client");
        Self { client, config }
    }

    fn map_error(err: reqwest::Error) -> ChatError {
        if err.is_timeout() {
            ChatError::Completion(format!("request timed out: {err}"))
        } else if err.is_connect() {
            ChatError::Completion(format!("connection failed: {err}"))
        } else {
            ChatError::Completion(err.to_string())
        }
    }

    /// First text part of the first candidate carrying content. A blocked or
    /// empty response becomes an empty string, the provider's own signal.
    fn extract_text(resp: GenerateResponse) -> String {
        resp.candidates
            .into_iter()
            .find_map(|c| c.content)
            .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatModel for GeminiChat {
    async fn generate(&self, prompt: &ChatPrompt) -> ChatResult<String> {
        let body = serde_json::json!({
            "contents": [{"role": "user", "parts": [{"text": prompt.user}]}],
            "systemInstruction": {"parts": [{"text": prompt.system}]},
            "generationConfig": {"temperature": self.config.temperature},
        });

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
            self.config.api_key
        );

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
            return Err(ChatError::Completion(format!(
                "status {}: {}",
                status.as_u16(),
                raw
            )));
        }

        let parsed: GenerateResponse = serde_json::from_str(&raw)
            .map_err(|e| ChatError::Completion(format!("unexpected response shape: {e}")))?;

        Ok(Self::extract_text(parsed))
    }
}
