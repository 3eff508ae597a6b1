//! Feedback on the current answer.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use hepscope_common::error::ApiError;
use hepscope_rag::feedback::FeedbackState;

use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct FeedbackForm {
    pub helpful: bool,
    pub comment: Option<String>,
}

/// POST /api/sessions/{id}/feedback
pub async fn submit_feedback(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(form): Json<FeedbackForm>,
) -> Result<Json<FeedbackState>, ApiError> {
    let session = state.session(id).await?;
    Ok(Json(session.submit_feedback(form.helpful, form.comment).await?))
}

/// GET /api/sessions/{id}/feedback
pub async fn get_feedback(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FeedbackState>, ApiError> {
    Ok(Json(state.session(id).await?.feedback().await))
}

/// POST /api/sessions/{id}/feedback/reset
pub async fn reset_feedback(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.session(id).await?.reset_feedback().await;
    Ok(StatusCode::NO_CONTENT)
}
