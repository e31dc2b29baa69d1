//! medibot — entry point.
//!
//! Loads the two required secrets from the environment (a `.env` file is
//! honored), resolves the Pinecone index, and starts the chat service on
//! `0.0.0.0:8080`.
//!
//! # Environment variables
//!
//! | Variable | Required | Description |
//! |----------|----------|-------------|
//! | `PINECONE_API_KEY` | yes | Pinecone API key (control and data plane). |
//! | `GEMINI_API_KEY` | yes | Google Generative Language API key. |

use medibot::chain::RagChain;
use medibot::embedding::{GeminiEmbedder, GeminiEmbedderConfig};
use medibot::llm::{GeminiChat, GeminiChatConfig};
use medibot::pinecone::{PineconeConfig, PineconeIndex};
use medibot::retrieval::IndexRetriever;
use medibot::server::{self, AppState};
use medibot::settings::Settings;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Pinecone index holding the ingested corpus.
const INDEX_NAME: &str = "medical-chatbot";
/// Listen address.
const LISTEN_ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("medibot=info".parse().unwrap()),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("medibot error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;

    let index = PineconeIndex::connect(PineconeConfig::new(
        &settings.pinecone_api_key,
        INDEX_NAME,
    ))
    .await?;
    info!(
        index = INDEX_NAME,
        endpoint = index.endpoint(),
        "pinecone index resolved"
    );

    let embedder = GeminiEmbedder::new(GeminiEmbedderConfig::new(&settings.gemini_api_key));
    let model = GeminiChat::new(GeminiChatConfig::new(&settings.gemini_api_key));

    let retriever = IndexRetriever::new(Arc::new(embedder), Arc::new(index));
    let chain = RagChain::new(Arc::new(retriever), Arc::new(model));

    server::serve(AppState::new(Arc::new(chain)), LISTEN_ADDR).await?;
    Ok(())
}
