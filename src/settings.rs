//! Process configuration.

use crate::error::{ChatError, ChatResult};

/// Immutable process configuration, loaded once at startup.
///
/// Exactly two secrets are read from the environment. Everything else about
/// the deployment (index name, model ids, listen address, retrieval depth)
/// is a hardcoded constant at its point of use.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Pinecone API key (control and data plane).
    pub pinecone_api_key: String,
    /// Google Generative Language API key.
    pub gemini_api_key: String,
}

impl Settings {
    /// Read settings from the environment. Callers load `.env` beforehand.
    pub fn from_env() -> ChatResult<Self> {
        Ok(Self {
            pinecone_api_key: require("PINECONE_API_KEY")?,
            gemini_api_key: require("GEMINI_API_KEY")?,
        })
    }
}

fn require(name: &str) -> ChatResult<String> {
    std::env::var(name)
        .map_err(|_| ChatError::Configuration(format!("{name} environment variable not set")))
}
