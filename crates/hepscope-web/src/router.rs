//! Axum router: maps all URL paths to handlers.

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
    compression::CompressionLayer,
};
use crate::state::SharedState;
use crate::handlers::{
    page::index,
    sessions::{create_session, delete_session, search, current_answer},
    papers::{open_paper, close_paper, get_chat, post_chat, clear_chat, suggested_questions},
    feedback::{submit_feedback, get_feedback, reset_feedback},
    pdf::get_pdf,
    literature::{search_papers, get_paper},
};
use crate::sse::sse_handler;

/// Build and return the full Axum router.
///
/// Takes the state by handle so the caller can keep sweeping sessions.
pub fn build_router(shared: SharedState) -> Router {
    Router::new()
        // Page
        .route("/", get(index))

        // Sessions
        .route("/api/sessions",               post(create_session))
        .route("/api/sessions/{id}",          delete(delete_session))
        .route("/api/sessions/{id}/events",   get(sse_handler))
        .route("/api/sessions/{id}/search",   get(current_answer).post(search))
        .route("/api/sessions/{id}/pdf",      get(get_pdf))

        // Paper viewer and chat
        .route("/api/sessions/{id}/papers/{paper_id}/open",  post(open_paper))
        .route("/api/sessions/{id}/papers/{paper_id}/close", post(close_paper))
        .route(
            "/api/sessions/{id}/papers/{paper_id}/chat",
            get(get_chat).post(post_chat).delete(clear_chat),
        )
        .route("/api/suggested-questions", get(suggested_questions))

        // Feedback
        .route("/api/sessions/{id}/feedback",       get(get_feedback).post(submit_feedback))
        .route("/api/sessions/{id}/feedback/reset", post(reset_feedback))

        // INSPIRE passthrough
        .route("/api/papers",            get(search_papers))
        .route("/api/papers/{paper_id}", get(get_paper))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
