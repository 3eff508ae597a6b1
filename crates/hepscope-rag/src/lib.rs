//! hepscope-rag: Client side of the RAG answer service.
//! Implements the `RagBackend` trait over HTTP, citation-aware answer
//! rendering, per-paper chat transcripts and answer feedback state.

pub mod backend;
pub mod chat;
pub mod feedback;
pub mod render;

pub use backend::{
    FeedbackRequest, FeedbackResponse, HttpRagBackend, QueryRequest, RagAnswer, RagBackend, RagError,
};
pub use chat::{ChatHistories, ChatMessage, PendingTurn, Role, SUGGESTED_QUESTIONS};
pub use feedback::FeedbackState;
pub use render::{render_with_citations, strip_citation_markers, AnswerSegment};
