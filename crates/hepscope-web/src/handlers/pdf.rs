//! PDF bytes for the viewer, served from the session's cache.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use hepscope_common::error::ApiError;

use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct PdfQuery {
    pub url: String,
}

/// GET /api/sessions/{id}/pdf?url=...
pub async fn get_pdf(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PdfQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.session(id).await?;
    let blob = session
        .pdf(&query.url)
        .await
        .ok_or_else(|| ApiError::Upstream(format!("Failed to fetch PDF from {}", query.url)))?;

    // A concurrent search may have revoked the handle already.
    let bytes = blob
        .data()
        .map(|d| d.to_vec())
        .ok_or_else(|| ApiError::NotFound("PDF was released by a newer search".to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::ETAG, format!("\"{}\"", blob.id())),
        ],
        bytes,
    ))
}
