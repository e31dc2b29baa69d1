//! Prompt assembly.
//!
//! The system instruction is fixed; the retrieved passages are substituted
//! into its `{context}` placeholder at request time. The user's message is
//! never templated and travels to the model exactly as typed.

use crate::retrieval::ScoredPassage;

/// System instruction for the QA persona. `{context}` is replaced with the
/// rendered passages.
pub const SYSTEM_PROMPT: &str = "You are a medical question-answering assistant. \
    Use the following pieces of retrieved context to answer the question. \
    If you don't know the answer, say that you don't know. \
    Use three sentences maximum and keep the answer concise.\n\n{context}";

/// Placeholder replaced by [`build_prompt`].
const CONTEXT_PLACEHOLDER: &str = "{context}";

/// One fully assembled model request: system instruction first, then the
/// user's message.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

/// Join passage texts with a blank line between each.
pub fn render_context(passages: &[ScoredPassage]) -> String {
    passages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Fill the system template with `context` and pair it with the raw user
/// message.
pub fn build_prompt(context: &str, user_message: &str) -> ChatPrompt {
    ChatPrompt {
        system: SYSTEM_PROMPT.replace(CONTEXT_PLACEHOLDER, context),
        user: user_message.to_string(),
    }
}
