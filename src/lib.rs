//! medibot — retrieval-augmented medical chatbot endpoint.
//!
//! One request flow wired from managed services: each incoming chat message
//! is embedded, the nearest passages are fetched from a Pinecone index, and
//! the passages plus the raw question go to Gemini for the final answer.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`settings`] | Environment-backed configuration. |
//! | [`embedding`] | Query embedding via Gemini `embedContent`. |
//! | [`pinecone`] | Similarity search against the Pinecone index. |
//! | [`retrieval`] | Retrieval contracts and the embed-then-search composition. |
//! | [`prompt`] | System instruction and context templating. |
//! | [`llm`] | Answer generation via Gemini `generateContent`. |
//! | [`chain`] | The end-to-end answer chain. |
//! | [`server`] | Axum HTTP surface. |

pub mod chain;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod pinecone;
pub mod prompt;
pub mod retrieval;
pub mod server;
pub mod settings;

pub use chain::{RagChain, TOP_K};
pub use error::{ChatError, ChatResult};
pub use server::{AppState, build_app, serve};
