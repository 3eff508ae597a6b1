//! Paper viewer and per-paper chat.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hepscope_common::error::ApiError;
use hepscope_rag::chat::{ChatMessage, SUGGESTED_QUESTIONS};

use crate::session::OpenPaper;
use crate::state::SharedState;

/// POST /api/sessions/{id}/papers/{paper_id}/open
pub async fn open_paper(
    State(state): State<SharedState>,
    Path((id, paper_id)): Path<(Uuid, String)>,
) -> Result<Json<OpenPaper>, ApiError> {
    let session = state.session(id).await?;
    Ok(Json(session.open_paper(&paper_id).await?))
}

/// POST /api/sessions/{id}/papers/{paper_id}/close
pub async fn close_paper(
    State(state): State<SharedState>,
    Path((id, _paper_id)): Path<(Uuid, String)>,
) -> Result<StatusCode, ApiError> {
    state.session(id).await?.close_paper().await;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct ChatTranscript {
    pub paper_id: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

/// GET /api/sessions/{id}/papers/{paper_id}/chat
pub async fn get_chat(
    State(state): State<SharedState>,
    Path((id, paper_id)): Path<(Uuid, String)>,
) -> Result<Json<ChatTranscript>, ApiError> {
    let messages = state.session(id).await?.chat_history(&paper_id).await;
    Ok(Json(ChatTranscript { paper_id, messages }))
}

/// POST /api/sessions/{id}/papers/{paper_id}/chat
pub async fn post_chat(
    State(state): State<SharedState>,
    Path((id, paper_id)): Path<(Uuid, String)>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatTranscript>, ApiError> {
    let session = state.session(id).await?;
    let messages = session.chat(&paper_id, &req.question).await?;
    Ok(Json(ChatTranscript { paper_id, messages }))
}

/// DELETE /api/sessions/{id}/papers/{paper_id}/chat
pub async fn clear_chat(
    State(state): State<SharedState>,
    Path((id, paper_id)): Path<(Uuid, String)>,
) -> Result<StatusCode, ApiError> {
    state.session(id).await?.clear_chat(&paper_id).await;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct SuggestedQuestion {
    pub label: &'static str,
    pub question: &'static str,
}

/// GET /api/suggested-questions
pub async fn suggested_questions() -> Json<Vec<SuggestedQuestion>> {
    Json(
        SUGGESTED_QUESTIONS
            .iter()
            .map(|&(label, question)| SuggestedQuestion { label, question })
            .collect(),
    )
}
