//! HTTP API.
//!
//! `POST /chat` answers with retrieval (`type` other than `llm`) or directly
//! (`type: "llm"`). Any error maps to HTTP 500 with a `detail` message, except
//! completion failures under the soft policy, which are reported inside a 200
//! response body.

use crate::config::{GenerationFailurePolicy, ServerSettings};
use crate::error::RagError;
use crate::rag::{Assistant, ChatMode};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, instrument, warn};

/// Shared application state.
pub struct AppState {
    assistant: Assistant,
    indexed_chunks: usize,
    generation_failure: GenerationFailurePolicy,
    welcome_message: String,
}

impl AppState {
    pub fn new(assistant: Assistant, indexed_chunks: usize, server: &ServerSettings) -> Self {
        Self {
            assistant,
            indexed_chunks,
            generation_failure: server.generation_failure,
            welcome_message: server.welcome_message.clone(),
        }
    }
}

/// Build the router with CORS enabled for any origin.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .route("/chat", post(chat))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    #[serde(rename = "type", default = "default_chat_type")]
    pub kind: String,
}

fn default_chat_type() -> String {
    "rag".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub query: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Text returned in place of an answer when the soft policy absorbs a completion failure.
pub fn soft_failure_message(cause: &str) -> String {
    format!("An error occurred while calling the completion API: {}", cause)
}

fn internal_error(detail: String) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { detail })).into_response()
}

// === Handlers ===

async fn welcome(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({ "message": state.welcome_message }))
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok", "chunks": state.indexed_chunks }))
}

#[instrument(skip_all)]
async fn chat(State(state): State<Arc<AppState>>, Json(req): Json<ChatRequest>) -> Response {
    let mode = ChatMode::from_request_type(&req.kind);

    let response = match state.assistant.answer(&req.query, mode).await {
        Ok(answer) => answer.text,
        Err(RagError::Generation(cause))
            if state.generation_failure == GenerationFailurePolicy::Soft =>
        {
            warn!("Completion failed, answering with error text: {}", cause);
            soft_failure_message(&cause)
        }
        Err(e) => {
            error!("Chat request failed: {}", e);
            return internal_error(e.to_string());
        }
    };

    Json(ChatResponse {
        query: req.query,
        kind: req.kind,
        response,
    })
    .into_response()
}
