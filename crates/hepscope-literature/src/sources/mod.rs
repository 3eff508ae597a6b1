//! Literature source clients.

pub mod inspire;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::models::Paper;

/// Result ordering supported by the literature search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    MostRecent,
    MostCited,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::MostRecent => "mostrecent",
            SortOrder::MostCited  => "mostcited",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub size: Option<u32>,
    pub page: Option<u32>,
    pub sort: Option<SortOrder>,
    #[serde(default)]
    pub fields: Vec<String>,
}

impl SearchParams {
    pub fn query(q: impl Into<String>) -> Self {
        Self { q: Some(q.into()), ..Self::default() }
    }

    /// Query-string pairs in the order the API documents them.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(q) = &self.q {
            pairs.push(("q", q.clone()));
        }
        if let Some(size) = self.size.filter(|s| *s > 0) {
            pairs.push(("size", size.to_string()));
        }
        if let Some(page) = self.page.filter(|p| *p > 0) {
            pairs.push(("page", page.to_string()));
        }
        if let Some(sort) = self.sort {
            pairs.push(("sort", sort.as_str().to_string()));
        }
        if !self.fields.is_empty() {
            pairs.push(("fields", self.fields.join(",")));
        }
        pairs
    }
}

/// One page of search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage {
    pub total: u64,
    pub papers: Vec<Paper>,
    /// Link to the next page, if the API reported one.
    pub next: Option<String>,
}

/// Common interface for literature metadata services.
#[async_trait]
pub trait LiteratureSource: Send + Sync {
    /// Search for papers matching a query.
    async fn search(&self, params: &SearchParams) -> anyhow::Result<SearchPage>;

    /// Fetch a single paper by its source identifier.
    async fn fetch_by_id(&self, id: &str) -> anyhow::Result<Paper>;
}
