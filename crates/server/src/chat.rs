//! Chat surface for the support pipeline.
//!
//! Endpoints:
//! - `POST /chat`      - one conversation turn
//! - `GET  /greeting`  - greeting message plus sample queries
//! - `GET  /history`   - a session's turn history
//! - `POST /clear`     - reset a session's history
//!
//! Sessions are keyed by UUID. A request without a `session_id` starts a
//! fresh session; an unknown `session_id` starts a fresh session under
//! that id, which keeps retries idempotent for clients.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use orderly_agent::llm::LlmClient;
use orderly_agent::session::{ConversationSession, ConversationTurn, ResponseSource};
use orderly_core::domain::resolution::ResolutionPayload;
use orderly_core::errors::InterfaceError;
use orderly_core::store::OrderStore;

type SessionHandle = Arc<Mutex<ConversationSession>>;

#[derive(Clone)]
pub struct ChatState {
    store: Arc<dyn OrderStore>,
    llm: Arc<dyn LlmClient>,
    llm_timeout: Duration,
    sessions: Arc<Mutex<HashMap<Uuid, SessionHandle>>>,
}

impl ChatState {
    pub fn new(store: Arc<dyn OrderStore>, llm: Arc<dyn LlmClient>, llm_timeout: Duration) -> Self {
        Self { store, llm, llm_timeout, sessions: Arc::new(Mutex::new(HashMap::new())) }
    }

    /// Fetch or create the session for `session_id`. The map lock is
    /// held only for the lookup; turns lock the individual session.
    async fn session_handle(&self, session_id: Uuid) -> SessionHandle {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(session_id)
            .or_insert_with(|| {
                Arc::new(Mutex::new(ConversationSession::new(
                    self.store.clone(),
                    self.llm.clone(),
                    self.llm_timeout,
                )))
            })
            .clone()
    }

    async fn existing_session(&self, session_id: Uuid) -> Option<SessionHandle> {
        self.sessions.lock().await.get(&session_id).cloned()
    }
}

pub fn router(state: ChatState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/greeting", get(greeting))
        .route("/history", get(history))
        .route("/clear", post(clear))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub message: String,
    pub source: ResponseSource,
    pub session_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResolutionPayload>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

pub async fn chat(
    State(state): State<ChatState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    let text = request.message.trim();
    if text.is_empty() {
        let correlation_id = Uuid::new_v4().to_string();
        let error = InterfaceError::bad_request("empty chat message", correlation_id);
        warn!(
            event_name = "ingress.chat.bad_request",
            correlation_id = error.correlation_id(),
            "rejected empty chat message"
        );
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { success: false, message: error.user_message().to_string() }),
        ));
    }

    let session_id = request.session_id.unwrap_or_else(Uuid::new_v4);
    let session = state.session_handle(session_id).await;
    let reply = session.lock().await.handle_turn(text).await;

    Ok(Json(ChatResponse {
        success: reply.success,
        message: reply.message,
        source: reply.source,
        session_id,
        data: reply.data,
    }))
}

#[derive(Debug, Serialize)]
pub struct GreetingResponse {
    pub success: bool,
    pub greeting: &'static str,
    pub sample_queries: &'static [&'static str],
}

pub async fn greeting() -> Json<GreetingResponse> {
    Json(GreetingResponse {
        success: true,
        greeting: ConversationSession::greeting_message(),
        sample_queries: ConversationSession::sample_queries(),
    })
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub history: Vec<ConversationTurn>,
}

/// Unknown or absent sessions report an empty history rather than an
/// error; history is only meaningful to clients that already hold a
/// session id.
pub async fn history(
    State(state): State<ChatState>,
    Query(params): Query<HistoryParams>,
) -> Json<HistoryResponse> {
    let turns = match params.session_id {
        Some(session_id) => match state.existing_session(session_id).await {
            Some(session) => session.lock().await.history().to_vec(),
            None => Vec::new(),
        },
        None => Vec::new(),
    };

    Json(HistoryResponse { success: true, history: turns })
}

#[derive(Debug, Deserialize)]
pub struct ClearRequest {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
}

pub async fn clear(
    State(state): State<ChatState>,
    Json(request): Json<ClearRequest>,
) -> Json<ClearResponse> {
    if let Some(session) = state.existing_session(request.session_id).await {
        session.lock().await.clear_history();
    }

    Json(ClearResponse { success: true, message: "Conversation history cleared.".to_string() })
}
