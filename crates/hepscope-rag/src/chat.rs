//! Per-paper chat transcripts.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "type")]
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Canned follow-up questions offered next to the chat box: (label, question).
pub const SUGGESTED_QUESTIONS: &[(&str, &str)] = &[
    ("Summary", "Provide a summary of this paper"),
    ("Contributions", "What are the main contributions?"),
    ("Methodology", "Explain the methodology used"),
    ("Limitations", "What are the limitations mentioned?"),
    ("Conclusions", "What are the key conclusions?"),
    ("Study Guide", "Create a study guide for this paper"),
];

/// A question that has been shown in the transcript but not yet answered.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    pub paper_id: String,
    pub question: String,
    /// Transcript before the question; sent as history and restored on failure.
    pub history: Vec<ChatMessage>,
}

/// Transcripts keyed by paper id, for one session.
#[derive(Debug, Default)]
pub struct ChatHistories {
    histories: HashMap<String, Vec<ChatMessage>>,
}

impl ChatHistories {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, paper_id: &str) -> Vec<ChatMessage> {
        self.histories.get(paper_id).cloned().unwrap_or_default()
    }

    pub fn update(&mut self, paper_id: &str, messages: Vec<ChatMessage>) {
        self.histories.insert(paper_id.to_string(), messages);
    }

    pub fn clear(&mut self, paper_id: &str) {
        self.histories.remove(paper_id);
    }

    pub fn clear_all(&mut self) {
        self.histories.clear();
    }

    /// Append the user's question right away. Blank questions are ignored.
    pub fn begin_turn(&mut self, paper_id: &str, question: &str) -> Option<PendingTurn> {
        if question.trim().is_empty() {
            return None;
        }
        let history = self.get(paper_id);
        let mut shown = history.clone();
        shown.push(ChatMessage::user(question));
        self.update(paper_id, shown);

        Some(PendingTurn {
            paper_id: paper_id.to_string(),
            question: question.to_string(),
            history,
        })
    }

    pub fn complete_turn(&mut self, turn: PendingTurn, answer: impl Into<String>) -> Vec<ChatMessage> {
        let mut messages = turn.history;
        messages.push(ChatMessage::user(turn.question));
        messages.push(ChatMessage::assistant(answer));
        self.update(&turn.paper_id, messages.clone());
        messages
    }

    pub fn abort_turn(&mut self, turn: PendingTurn) {
        self.update(&turn.paper_id, turn.history);
    }
}
