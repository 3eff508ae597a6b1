//! Per-user research session: the current answer, the open paper, chat
//! transcripts, answer feedback and the PDF cache.
//!
//! Session state sits behind a `tokio::sync::Mutex` that is never held
//! while a backend request is outstanding. Every top-level search bumps a
//! generation counter; results of requests started under an older generation
//! never touch the state.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use hepscope_common::error::ApiError;
use hepscope_common::notify::{Notice, Notifier};
use hepscope_literature::models::{FormattedCitation, Paper};
use hepscope_literature::pdf_cache::{PdfBlob, PdfCache, PdfFetcher};
use hepscope_literature::resolver::CitationResolver;
use hepscope_literature::sources::LiteratureSource;
use hepscope_rag::backend::{QueryRequest, RagAnswer, RagBackend, RagError};
use hepscope_rag::chat::{ChatHistories, ChatMessage};
use hepscope_rag::feedback::FeedbackState;
use hepscope_rag::render::{render_with_citations, strip_citation_markers, AnswerSegment};
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Toast shown when the AI service cannot answer.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again later.";

/// A resolved top-level answer, as returned to the page.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub query: String,
    pub answer: RagAnswer,
    pub segments: Vec<AnswerSegment>,
    /// Long answer without citation markers, for the clipboard.
    pub copy_text: String,
    pub citations: Vec<FormattedCitation>,
}

/// What the viewer needs to show a paper.
#[derive(Debug, Clone, Serialize)]
pub struct OpenPaper {
    pub paper: Paper,
    pub pdf_url: Option<String>,
    /// Prefix of the first cited snippet, searched for inside the PDF.
    pub highlight: Option<String>,
}

#[derive(Default)]
struct SessionState {
    /// Bumped by every search and by `close`.
    generation: u64,
    current: Option<SearchOutcome>,
    active_paper: Option<String>,
    chats: ChatHistories,
    feedback: FeedbackState,
}

impl SessionState {
    fn find_paper(&self, paper_id: &str) -> Option<&Paper> {
        self.current
            .as_ref()?
            .citations
            .iter()
            .map(|c| &c.paper)
            .find(|p| p.id == paper_id)
    }
}

/// Collaborators shared by every session.
#[derive(Clone)]
pub struct SessionDeps {
    pub rag: Arc<dyn RagBackend>,
    pub literature: Arc<dyn LiteratureSource>,
    pub fetcher: Arc<dyn PdfFetcher>,
    pub prefetch: bool,
}

pub struct ResearchSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    deps: SessionDeps,
    /// Notices for this session's page only.
    notifier: Notifier,
    resolver: CitationResolver,
    pdf_cache: Arc<PdfCache>,
    last_active: StdMutex<Instant>,
    state: Mutex<SessionState>,
}

fn upstream(err: RagError) -> ApiError {
    match err {
        RagError::Sandbox(e) => e.into(),
        other => ApiError::Upstream(other.to_string()),
    }
}

impl ResearchSession {
    pub fn new(deps: SessionDeps) -> Self {
        let notifier = Notifier::default();
        let resolver = CitationResolver::new(Arc::clone(&deps.literature), notifier.clone());
        let pdf_cache = Arc::new(PdfCache::new(Arc::clone(&deps.fetcher), notifier.clone()));
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            deps,
            notifier,
            resolver,
            pdf_cache,
            last_active: StdMutex::new(Instant::now()),
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn pdf_cache(&self) -> &PdfCache {
        &self.pdf_cache
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notifier.subscribe()
    }

    /// Record activity; called whenever the session is looked up.
    pub fn touch(&self) {
        *self.last_active.lock().unwrap_or_else(|p| p.into_inner()) = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_active.lock().unwrap_or_else(|p| p.into_inner()).elapsed()
    }

    async fn is_current(&self, generation: u64) -> bool {
        self.state.lock().await.generation == generation
    }

    /// Run a top-level question.
    ///
    /// Everything tied to the previous answer is dropped first: cached PDFs,
    /// the open paper and the feedback given on it. If another search starts
    /// before this one finishes, this answer is returned to its caller but
    /// not stored, and its PDFs are not prefetched.
    pub async fn search(&self, query: &str) -> Result<SearchOutcome, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::BadRequest("Query must not be empty".to_string()));
        }

        let (generation, cache_generation) = {
            let mut state = self.state.lock().await;
            state.generation += 1;
            state.active_paper = None;
            state.current = None;
            state.feedback.reset();
            self.pdf_cache.invalidate();
            (state.generation, self.pdf_cache.generation())
        };

        let answer = match self.deps.rag.query(QueryRequest::new(query)).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(session = %self.id, error = %e, "RAG query failed");
                if self.is_current(generation).await {
                    self.notifier.error(GENERIC_FAILURE);
                }
                return Err(upstream(e));
            }
        };

        let citations = self.resolver.resolve(&answer.citations).await;
        let outcome = SearchOutcome {
            query: query.to_string(),
            segments: render_with_citations(&answer.long_answer, &answer.citations),
            copy_text: strip_citation_markers(&answer.long_answer),
            answer,
            citations,
        };

        {
            let mut state = self.state.lock().await;
            if state.generation != generation {
                info!(session = %self.id, query, "Answer superseded by a newer search, not stored");
                return Ok(outcome);
            }
            state.current = Some(outcome.clone());
        }
        info!(
            session = %self.id,
            citations = outcome.citations.len(),
            "Answer ready"
        );

        if self.deps.prefetch {
            let urls: Vec<String> = outcome.citations.iter().filter_map(|c| c.paper.pdf_url()).collect();
            let cache = Arc::clone(&self.pdf_cache);
            tokio::spawn(async move {
                cache.prefetch(cache_generation, urls).await;
            });
        }

        Ok(outcome)
    }

    pub async fn current(&self) -> Option<SearchOutcome> {
        self.state.lock().await.current.clone()
    }

    /// Make one of the cited papers the active one.
    pub async fn open_paper(&self, paper_id: &str) -> Result<OpenPaper, ApiError> {
        let mut state = self.state.lock().await;
        let paper = state
            .find_paper(paper_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Paper {} is not cited by the current answer", paper_id)))?;
        state.active_paper = Some(paper_id.to_string());

        Ok(OpenPaper {
            pdf_url: paper.pdf_url(),
            highlight: paper.search_highlight(),
            paper,
        })
    }

    pub async fn close_paper(&self) {
        self.state.lock().await.active_paper = None;
    }

    pub async fn active_paper(&self) -> Option<String> {
        self.state.lock().await.active_paper.clone()
    }

    pub async fn chat_history(&self, paper_id: &str) -> Vec<ChatMessage> {
        self.state.lock().await.chats.get(paper_id)
    }

    pub async fn clear_chat(&self, paper_id: &str) {
        self.state.lock().await.chats.clear(paper_id);
    }

    /// Ask a follow-up question about one paper and return the transcript.
    ///
    /// The question is shown before the answer arrives; if the request fails
    /// the transcript goes back to what it was.
    pub async fn chat(&self, paper_id: &str, question: &str) -> Result<Vec<ChatMessage>, ApiError> {
        let control_number: u64 = paper_id
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("Invalid paper id: {}", paper_id)))?;

        let turn = {
            let mut state = self.state.lock().await;
            match state.chats.begin_turn(paper_id, question) {
                Some(turn) => turn,
                None => return Ok(state.chats.get(paper_id)),
            }
        };

        let req = QueryRequest::about_paper(&turn.question, control_number, turn.history.clone());
        match self.deps.rag.query(req).await {
            Ok(answer) => Ok(self.state.lock().await.chats.complete_turn(turn, answer.long_answer)),
            Err(e) => {
                warn!(session = %self.id, paper = paper_id, error = %e, "Paper chat failed");
                self.state.lock().await.chats.abort_turn(turn);
                self.notifier.error(GENERIC_FAILURE);
                Err(upstream(e))
            }
        }
    }

    /// Rate the current answer. A follow-up vote updates the earlier score.
    ///
    /// Only one vote is in flight at a time, so a quick second vote cannot
    /// create a second score. A response that arrives after a new search has
    /// replaced the answer is dropped.
    pub async fn submit_feedback(&self, helpful: bool, comment: Option<String>) -> Result<FeedbackState, ApiError> {
        let (req, previous, generation) = {
            let mut state = self.state.lock().await;
            let trace_id = state
                .current
                .as_ref()
                .and_then(|c| c.answer.trace_id.clone())
                .ok_or_else(|| ApiError::BadRequest("There is no answer to give feedback on".to_string()))?;
            if state.feedback.submitting {
                self.notifier.info("Your previous feedback is still being submitted");
                return Err(ApiError::BadRequest("Feedback is already being submitted".to_string()));
            }
            let req = state.feedback.request(&trace_id, helpful, comment.clone());
            let previous = state.feedback.mark_submitting(helpful);
            (req, previous, state.generation)
        };

        let result = self.deps.rag.submit_feedback(req).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!(session = %self.id, "Feedback response for a replaced answer dropped");
            return result.map(|_| state.feedback.clone()).map_err(upstream);
        }
        match result {
            Ok(resp) => {
                state.feedback.record(resp, comment);
                Ok(state.feedback.clone())
            }
            Err(e) => {
                warn!(session = %self.id, error = %e, "Feedback submission failed");
                state.feedback.fail(previous);
                self.notifier.error("Failed to submit feedback");
                Err(upstream(e))
            }
        }
    }

    pub async fn feedback(&self) -> FeedbackState {
        self.state.lock().await.feedback.clone()
    }

    pub async fn reset_feedback(&self) {
        self.state.lock().await.feedback.reset();
    }

    /// PDF bytes for `url` through the session's cache.
    pub async fn pdf(&self, url: &str) -> Option<Arc<PdfBlob>> {
        self.pdf_cache.get(url).await
    }

    /// Release everything the session holds.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        state.generation += 1;
        self.pdf_cache.invalidate();
        state.feedback.reset();
        state.chats.clear_all();
        state.current = None;
        state.active_paper = None;
    }
}
