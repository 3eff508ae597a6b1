//! Data models for papers and citations.

use serde::{Deserialize, Serialize};

/// Length of the highlight prefix used to seed in-document search.
pub const HIGHLIGHT_PREFIX_CHARS: usize = 15;

/// A paper as displayed to the user, converted from an INSPIRE record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    /// INSPIRE control number, as a string.
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    #[serde(default)]
    pub collaborations: Vec<String>,
    pub year: Option<i32>,
    pub journal: String,
    /// First affiliation of the first author, empty when unknown.
    #[serde(default)]
    pub affiliation: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Snippet that led to this paper; pre-seeds search inside the PDF.
    pub highlight: Option<String>,
    pub citation_count: u64,
    pub arxiv_id: Option<String>,
    pub doi: Option<String>,
    pub document_type: String,
    pub document_url: Option<String>,
}

impl Paper {
    /// Attach the snippet that referenced this paper.
    pub fn with_highlight(mut self, highlight: impl Into<String>) -> Self {
        self.highlight = Some(highlight.into());
        self
    }

    /// URL of the paper's PDF: the attached document if there is one,
    /// otherwise the arXiv PDF.
    pub fn pdf_url(&self) -> Option<String> {
        if let Some(url) = &self.document_url {
            return Some(url.clone());
        }
        self.arxiv_id
            .as_ref()
            .map(|id| format!("https://arxiv.org/pdf/{}", id))
    }

    /// The text the PDF viewer searches for when the paper is opened.
    pub fn search_highlight(&self) -> Option<String> {
        self.highlight
            .as_ref()
            .map(|h| h.chars().take(HIGHLIGHT_PREFIX_CHARS).collect())
    }
}

/// A citation entry in a RAG answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Number shown on the badge.
    pub doc_id: u32,
    /// INSPIRE control number of the cited paper.
    pub control_number: u64,
    pub snippet: String,
}

/// One entry of the "related papers" list: a resolved paper plus every
/// snippet the answer cited from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedCitation {
    pub id: u64,
    pub display: u32,
    pub paper: Paper,
    pub snippets: Vec<String>,
}

#[cfg(test)]
pub(crate) fn sample_paper(id: &str) -> Paper {
    Paper {
        id: id.to_string(),
        title: format!("Paper {id}"),
        authors: vec!["A. Author".to_string()],
        collaborations: vec![],
        year: Some(2012),
        journal: "Phys. Lett. B".to_string(),
        affiliation: String::new(),
        abstract_text: "No abstract available".to_string(),
        highlight: None,
        citation_count: 0,
        arxiv_id: None,
        doi: None,
        document_type: "article".to_string(),
        document_url: None,
    }
}
