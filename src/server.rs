//! Axum HTTP surface for the chat service.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Static chat page. |
//! | `POST` | `/get` | Answer one chat message (form field `msg`). |
//! | `GET`  | `/health` | Liveness check — always `200 OK`. |

use crate::chain::RagChain;
use crate::error::ChatError;
use axum::{
    Json, Router,
    extract::rejection::FormRejection,
    extract::{Form, State},
    response::Html,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

/// Chat page embedded at compile time and served at `/`.
const CHAT_PAGE: &str = include_str!("../templates/chat.html");

// ─────────────────────────────────────────────────────────────────────────────
// Shared application state
// ─────────────────────────────────────────────────────────────────────────────

/// Shared state injected into every handler via the [`State`] extractor.
#[derive(Clone)]
pub struct AppState {
    chain: Arc<RagChain>,
}

impl AppState {
    pub fn new(chain: Arc<RagChain>) -> Self {
        Self { chain }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Build the application router.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/get", post(chat_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the process exits.
pub async fn serve(state: AppState, addr: &str) -> std::io::Result<()> {
    let app = build_app(state);
    info!(addr = %addr, "medibot chat service starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Form body for `POST /get`. The field is optional so an absent `msg`
/// reaches the handler as a value instead of an extractor rejection.
#[derive(Debug, Deserialize)]
struct ChatForm {
    msg: Option<String>,
}

/// JSON body returned by `POST /get` in every case.
#[derive(Debug, Serialize)]
struct ChatReply {
    response: String,
}

/// `GET /` — the chat page.
async fn index_handler() -> Html<&'static str> {
    Html(CHAT_PAGE)
}

/// `GET /health` — liveness probe.
async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "service": "medibot" }))
}

/// `POST /get` — answer one chat message.
///
/// The wire contract is fixed by the chat page: always `200 OK` with a
/// `{"response": …}` body, failures rendered as an `Error: …` string in the
/// same field.
async fn chat_handler(
    State(state): State<AppState>,
    form: Result<Form<ChatForm>, FormRejection>,
) -> Json<ChatReply> {
    let request_id = Uuid::new_v4().to_string();

    let msg = match form {
        Ok(Form(ChatForm { msg: Some(msg) })) => msg,
        Ok(Form(ChatForm { msg: None })) => {
            return reply_error(&request_id, ChatError::MissingMessage);
        }
        Err(rejection) => {
            return reply_error(&request_id, ChatError::InvalidForm(rejection.body_text()));
        }
    };

    let start = std::time::Instant::now();
    match state.chain.answer(&msg).await {
        Ok(answer) => {
            info!(
                request_id = %request_id,
                duration_ms = start.elapsed().as_millis() as u64,
                "chat request completed"
            );
            Json(ChatReply { response: answer })
        }
        Err(err) => reply_error(&request_id, err),
    }
}

/// Render any failure into the fixed wire shape, logging its kind first.
fn reply_error(request_id: &str, err: ChatError) -> Json<ChatReply> {
    warn!(
        request_id = %request_id,
        kind = err.kind(),
        error = %err,
        "chat request failed"
    );
    Json(ChatReply {
        response: format!("Error: {err}"),
    })
}
