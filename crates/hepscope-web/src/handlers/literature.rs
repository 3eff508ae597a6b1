//! INSPIRE literature search passthrough and paper cards.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use hepscope_common::error::ApiError;
use hepscope_literature::authors::{
    arxiv_abs_url, citations_url, collaboration_url, format_authors, join_collaborations,
    literature_url, DEFAULT_AUTHOR_COUNT,
};
use hepscope_literature::models::Paper;
use hepscope_literature::sources::{SearchParams, SortOrder};

use crate::state::SharedState;

const MAX_PAGE_SIZE: u32 = 100;

/// A paper with its display lines and outbound links precomputed.
#[derive(Debug, Serialize)]
pub struct PaperCard {
    pub id: String,
    pub title: String,
    pub authors: String,
    /// Empty for papers without a collaboration.
    pub collaborations: String,
    /// INSPIRE search per collaboration, same order as the paper lists them.
    pub collaboration_urls: Vec<String>,
    pub year: Option<i32>,
    pub journal: String,
    pub citation_count: u64,
    pub inspire_url: String,
    pub citations_url: String,
    pub arxiv_url: Option<String>,
    pub pdf_url: Option<String>,
}

impl PaperCard {
    pub fn new(paper: &Paper, inspire_base: &str) -> Self {
        Self {
            id: paper.id.clone(),
            title: paper.title.clone(),
            authors: format_authors(&paper.authors, &paper.collaborations, DEFAULT_AUTHOR_COUNT),
            collaborations: join_collaborations(&paper.collaborations),
            collaboration_urls: paper
                .collaborations
                .iter()
                .filter_map(|c| collaboration_url(inspire_base, c).ok())
                .collect(),
            year: paper.year,
            journal: paper.journal.clone(),
            citation_count: paper.citation_count,
            inspire_url: literature_url(inspire_base, &paper.id),
            citations_url: citations_url(&paper.id),
            arxiv_url: paper.arxiv_id.as_deref().map(arxiv_abs_url),
            pdf_url: paper.pdf_url(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PaperSearchQuery {
    pub q: String,
    pub size: Option<u32>,
    pub page: Option<u32>,
    pub sort: Option<SortOrder>,
}

#[derive(Debug, Serialize)]
pub struct PaperSearchResponse {
    pub total: u64,
    pub papers: Vec<PaperCard>,
    pub next: Option<String>,
}

/// GET /api/papers - INSPIRE literature search
pub async fn search_papers(
    State(state): State<SharedState>,
    Query(query): Query<PaperSearchQuery>,
) -> Result<Json<PaperSearchResponse>, ApiError> {
    if query.q.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing search query".to_string()));
    }
    let params = SearchParams {
        q: Some(query.q),
        size: Some(query.size.unwrap_or(10).min(MAX_PAGE_SIZE)),
        page: query.page,
        sort: query.sort,
        fields: Vec::new(),
    };

    let page = state
        .literature
        .search(&params)
        .await
        .map_err(|e| ApiError::Upstream(format!("{:#}", e)))?;

    Ok(Json(PaperSearchResponse {
        total: page.total,
        papers: page.papers.iter().map(|p| PaperCard::new(p, &state.inspire_base_url)).collect(),
        next: page.next,
    }))
}

/// GET /api/papers/{paper_id} - single INSPIRE record
pub async fn get_paper(
    State(state): State<SharedState>,
    Path(paper_id): Path<String>,
) -> Result<Json<PaperCard>, ApiError> {
    if paper_id.parse::<u64>().is_err() {
        return Err(ApiError::BadRequest(format!("Invalid paper id: {}", paper_id)));
    }
    let paper = state
        .literature
        .fetch_by_id(&paper_id)
        .await
        .map_err(|e| ApiError::Upstream(format!("{:#}", e)))?;
    Ok(Json(PaperCard::new(&paper, &state.inspire_base_url)))
}
