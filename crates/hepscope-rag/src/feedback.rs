//! Thumbs-up/down state for the current answer.
//!
//! The state is split from the network call so the owner can release its
//! lock while the request is in flight:
//!
//! ```text
//! let req = state.request(trace_id, helpful, comment);
//! let previous = state.mark_submitting(helpful);
//! match backend.submit_feedback(req).await {
//!     Ok(resp) => state.record(resp, comment),
//!     Err(_)   => state.fail(previous),
//! }
//! ```

use serde::Serialize;

use crate::backend::{FeedbackRequest, FeedbackResponse};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedbackState {
    /// `None` until the user has voted.
    pub feedback: Option<bool>,
    pub score_id: Option<String>,
    pub submitting: bool,
    pub submitted_comment: Option<String>,
}

impl FeedbackState {
    /// Build the request for a vote. A score id from an earlier vote is
    /// carried along so the backend updates that score instead of adding one.
    pub fn request(&self, trace_id: &str, helpful: bool, comment: Option<String>) -> FeedbackRequest {
        FeedbackRequest {
            trace_id: trace_id.to_string(),
            helpful,
            comment: comment.filter(|c| !c.trim().is_empty()),
            score_id: self.score_id.clone(),
        }
    }

    /// Show the vote right away; returns the flag to restore on failure.
    pub fn mark_submitting(&mut self, helpful: bool) -> Option<bool> {
        self.submitting = true;
        self.feedback.replace(helpful)
    }

    pub fn record(&mut self, response: FeedbackResponse, comment: Option<String>) {
        self.submitting = false;
        self.score_id = Some(response.score_id);
        if let Some(comment) = comment.filter(|c| !c.trim().is_empty()) {
            self.submitted_comment = Some(comment);
        }
    }

    pub fn fail(&mut self, previous: Option<bool>) {
        self.submitting = false;
        self.feedback = previous;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn response(id: &str) -> FeedbackResponse {
        FeedbackResponse { score_id: id.to_string() }
    }

    #[test]
    fn test_first_vote_has_no_score_id() {
        let state = FeedbackState::default();
        let req = state.request("trace-1", true, None);
        assert_eq!(req.score_id, None);
        assert!(req.helpful);
    }

    #[test]
    fn test_second_vote_reuses_score_id() {
        let mut state = FeedbackState::default();
        state.mark_submitting(true);
        state.record(response("score-7"), None);

        let req = state.request("trace-1", false, Some("Wrong paper cited".into()));
        let previous = state.mark_submitting(false);

        assert_eq!(req.score_id.as_deref(), Some("score-7"));
        assert_eq!(req.comment.as_deref(), Some("Wrong paper cited"));
        assert_eq!(previous, Some(true));
        assert_eq!(state.feedback, Some(false));
        assert!(state.submitting);

        state.record(response("score-7"), req.comment.clone());
        assert_eq!(state.submitted_comment.as_deref(), Some("Wrong paper cited"));
        assert!(!state.submitting);
    }

    #[test]
    fn test_failed_vote_restores_previous_flag() {
        let mut state = FeedbackState::default();
        let previous = state.mark_submitting(false);
        state.fail(previous);
        assert_eq!(state, FeedbackState::default());
    }

    #[test]
    fn test_blank_comment_is_dropped() {
        let state = FeedbackState::default();
        assert_eq!(state.request("t", true, Some("  ".into())).comment, None);
    }

    #[test]
    fn test_reset() {
        let mut state = FeedbackState::default();
        state.mark_submitting(true);
        state.record(response("s"), Some("good".into()));
        state.reset();
        assert_eq!(state, FeedbackState::default());
    }
}
