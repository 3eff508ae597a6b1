//! Server-Sent Events (SSE) stream of user-visible notices.

use axum::response::sse::{Event, KeepAlive, Sse};
use axum::extract::{Path, State};
use futures_core::Stream;
use hepscope_common::error::ApiError;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use uuid::Uuid;

use crate::state::SharedState;

/// GET /api/sessions/{id}/events - the session's notices, as `notice` events.
/// The stream ends when the session is closed.
pub async fn sse_handler(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let rx = state.session(id).await?.subscribe();
    // Lagged receivers skip what they missed.
    let stream = BroadcastStream::new(rx)
        .filter_map(|result| {
            result.ok().and_then(|notice| {
                serde_json::to_string(&notice).ok().map(|data| {
                    Ok(Event::default().event("notice").data(data))
                })
            })
        });

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    ))
}
