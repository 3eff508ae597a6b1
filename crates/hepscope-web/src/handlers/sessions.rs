//! Session lifecycle and top-level search.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hepscope_common::error::ApiError;

use crate::handlers::literature::PaperCard;
use crate::session::SearchOutcome;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// POST /api/sessions
pub async fn create_session(State(state): State<SharedState>) -> (StatusCode, Json<SessionCreated>) {
    let session = state.create_session().await;
    (
        StatusCode::CREATED,
        Json(SessionCreated { session_id: session.id, created_at: session.created_at }),
    )
}

/// DELETE /api/sessions/{id}
pub async fn delete_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.remove_session(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    #[serde(flatten)]
    pub outcome: SearchOutcome,
    /// Display cards for `outcome.citations`, same order.
    pub cards: Vec<PaperCard>,
}

fn to_response(outcome: SearchOutcome, inspire_base: &str) -> SearchResponse {
    let cards = outcome
        .citations
        .iter()
        .map(|c| PaperCard::new(&c.paper, inspire_base))
        .collect();
    SearchResponse { outcome, cards }
}

/// POST /api/sessions/{id}/search
pub async fn search(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let session = state.session(id).await?;
    let outcome = session.search(&req.query).await?;
    Ok(Json(to_response(outcome, &state.inspire_base_url)))
}

/// GET /api/sessions/{id}/search - the last answer, if any
pub async fn current_answer(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Option<SearchResponse>>, ApiError> {
    let session = state.session(id).await?;
    Ok(Json(session.current().await.map(|o| to_response(o, &state.inspire_base_url))))
}
