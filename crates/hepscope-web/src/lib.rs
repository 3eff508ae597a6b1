//! hepscope-web: Web front end for hepscope
//! Provides a research page with:
//!   - Literature questions answered by the RAG service, with citation badges
//!   - Related papers resolved from INSPIRE, with an in-page PDF viewer
//!   - Per-paper follow-up chat
//!   - Answer feedback
//!   - Live notices over SSE

pub mod config;
pub mod router;
pub mod handlers;
pub mod session;
pub mod state;
pub mod sse;
