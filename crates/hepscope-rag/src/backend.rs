//! RAG backend trait and its HTTP implementation.
//!
//! Endpoints (relative to the AI service base URL):
//!   POST /v1/query-rag     question (+ paper, + history) → answer with citations
//!   POST /v1/rag-feedback  thumbs up/down and comment against a trace id

use std::collections::BTreeMap;

use async_trait::async_trait;
use hepscope_common::error::HepscopeError;
use hepscope_common::sandbox::SandboxClient;
use hepscope_literature::models::Citation;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::chat::ChatMessage;

pub const DEFAULT_AI_URL: &str = "https://inspirehep.net/ai";

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RagError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Request blocked: {0}")]
    Sandbox(#[from] HepscopeError),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("API error [{status}]: {message}")]
    ApiError { status: u16, message: String },
}

// ── Request / Response ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    /// Restricts the question to one paper (per-paper chat).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<ChatMessage>>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), control_number: None, history: None }
    }

    pub fn about_paper(query: impl Into<String>, control_number: u64, history: Vec<ChatMessage>) -> Self {
        Self {
            query: query.into(),
            control_number: Some(control_number),
            history: Some(history),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagAnswer {
    #[serde(default)]
    pub brief_answer: String,
    pub long_answer: String,
    /// Keyed by zero-based citation number; numeric keys keep answer order.
    #[serde(default)]
    pub citations: BTreeMap<u32, Citation>,
    #[serde(default)]
    pub trace_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub trace_id: String,
    pub helpful: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Score returned by an earlier submission for the same answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub score_id: String,
}

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait RagBackend: Send + Sync {
    async fn query(&self, req: QueryRequest) -> Result<RagAnswer, RagError>;
    async fn submit_feedback(&self, req: FeedbackRequest) -> Result<FeedbackResponse, RagError>;
}

async fn check_response_status(resp: reqwest::Response) -> Result<serde_json::Value, RagError> {
    let status = resp.status().as_u16();
    if status >= 400 {
        let body: serde_json::Value = resp.json().await.unwrap_or(serde_json::Value::Null);
        let msg = body["detail"]
            .as_str()
            .or_else(|| body["error"]["message"].as_str())
            .or_else(|| body["message"].as_str())
            .unwrap_or("unknown API error")
            .to_string();
        return Err(RagError::ApiError { status, message: msg });
    }
    Ok(resp.json().await?)
}

// ── HTTP ──────────────────────────────────────────────────────────────────────

pub struct HttpRagBackend {
    pub base_url: String,
    client: SandboxClient,
}

impl HttpRagBackend {
    pub fn new(base_url: impl Into<String>, client: SandboxClient) -> Self {
        let base_url: String = base_url.into();
        Self { base_url: base_url.trim_end_matches('/').to_string(), client }
    }
}

#[async_trait]
impl RagBackend for HttpRagBackend {
    #[instrument(skip(self, req), fields(control_number = ?req.control_number))]
    async fn query(&self, req: QueryRequest) -> Result<RagAnswer, RagError> {
        let url = format!("{}/v1/query-rag", self.base_url);
        let resp = self.client.post(&url)?.json(&req).send().await?;
        let json = check_response_status(resp).await?;
        let answer: RagAnswer = serde_json::from_value(json)?;
        debug!(
            citations = answer.citations.len(),
            trace_id = answer.trace_id.as_deref().unwrap_or(""),
            "RAG answer received"
        );
        Ok(answer)
    }

    #[instrument(skip(self, req), fields(trace_id = %req.trace_id, helpful = req.helpful))]
    async fn submit_feedback(&self, req: FeedbackRequest) -> Result<FeedbackResponse, RagError> {
        let url = format!("{}/v1/rag-feedback", self.base_url);
        let resp = self.client.post(&url)?.json(&req).send().await?;
        let json = check_response_status(resp).await?;
        Ok(serde_json::from_value(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Role;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_query_request_omits_unset_fields() {
        let json = serde_json::to_value(QueryRequest::new("What is the Higgs mass?")).unwrap();
        assert_eq!(json, serde_json::json!({ "query": "What is the Higgs mass?" }));
    }

    #[test]
    fn test_paper_query_carries_history() {
        let history = vec![ChatMessage::user("Summary?"), ChatMessage::assistant("It observes a boson.")];
        let json = serde_json::to_value(QueryRequest::about_paper("Limitations?", 1124337, history)).unwrap();
        assert_eq!(json["control_number"], 1124337);
        assert_eq!(json["history"][0]["type"], "user");
        assert_eq!(json["history"][1]["type"], "assistant");
        assert_eq!(json["history"][1]["content"], "It observes a boson.");
    }

    #[test]
    fn test_answer_citations_are_numerically_ordered() {
        let answer: RagAnswer = serde_json::from_value(serde_json::json!({
            "brief_answer": "Yes.",
            "long_answer": "See [1] and [11].",
            "citations": {
                "10": { "doc_id": 11, "control_number": 2, "snippet": "b" },
                "0":  { "doc_id": 1,  "control_number": 1, "snippet": "a" },
                "2":  { "doc_id": 3,  "control_number": 3, "snippet": "c" }
            },
            "trace_id": "trace-1"
        }))
        .unwrap();
        let keys: Vec<u32> = answer.citations.keys().copied().collect();
        assert_eq!(keys, vec![0, 2, 10]);
        assert_eq!(answer.trace_id.as_deref(), Some("trace-1"));
    }

    #[test]
    fn test_chat_answer_without_citations_parses() {
        let answer: RagAnswer =
            serde_json::from_value(serde_json::json!({ "long_answer": "Only text" })).unwrap();
        assert!(answer.citations.is_empty());
        assert_eq!(answer.brief_answer, "");
        assert_eq!(answer.trace_id, None);
    }

    #[test]
    fn test_feedback_request_shape() {
        let req = FeedbackRequest {
            trace_id: "t".to_string(),
            helpful: false,
            comment: None,
            score_id: Some("s-1".to_string()),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({ "trace_id": "t", "helpful": false, "score_id": "s-1" }));
        assert_eq!(ChatMessage::user("x").role, Role::User);
    }
}
