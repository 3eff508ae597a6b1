//! INSPIRE-HEP literature API client.
//!
//! Endpoints:
//!   {api}/literature?q=…&size=…&page=…&sort=…&fields=…
//!   {api}/literature/{control_number}

use anyhow::Context;
use async_trait::async_trait;
use hepscope_common::error::HepscopeError;
use hepscope_common::sandbox::SandboxClient as Client;
use tracing::{debug, instrument};

use crate::models::Paper;
use super::{LiteratureSource, SearchPage, SearchParams};

pub const INSPIRE_API_URL: &str = "https://inspirehep.net/api";

pub struct InspireClient {
    client: Client,
    api_base: String,
}

impl InspireClient {
    pub fn new(client: Client) -> Self {
        Self { client, api_base: INSPIRE_API_URL.to_string() }
    }

    /// Point the client at another deployment (e.g. inspirebeta.net).
    pub fn with_api_base(mut self, url: &str) -> Self {
        self.api_base = url.trim_end_matches('/').to_string();
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    async fn get_json(&self, request: reqwest::RequestBuilder, url: &str) -> anyhow::Result<serde_json::Value> {
        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(HepscopeError::UpstreamStatus {
                status: resp.status().as_u16(),
                url: url.to_string(),
            }
            .into());
        }
        Ok(resp.json::<serde_json::Value>().await?)
    }
}

#[async_trait]
impl LiteratureSource for InspireClient {
    #[instrument(skip(self))]
    async fn search(&self, params: &SearchParams) -> anyhow::Result<SearchPage> {
        let url = format!("{}/literature", self.api_base);
        let request = self.client.get(&url)?.query(&params.to_query_pairs());
        let body = self
            .get_json(request, &url)
            .await
            .context("INSPIRE search failed")?;

        let hits = body["hits"]["hits"].as_array().cloned().unwrap_or_default();
        debug!(count = hits.len(), "INSPIRE search returned results");

        Ok(SearchPage {
            total: body["hits"]["total"].as_u64().unwrap_or(hits.len() as u64),
            papers: hits.iter().map(record_to_paper).collect(),
            next: body["links"]["next"].as_str().map(String::from),
        })
    }

    #[instrument(skip(self))]
    async fn fetch_by_id(&self, id: &str) -> anyhow::Result<Paper> {
        // Record ids are control numbers; anything else would change the path.
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            anyhow::bail!("Invalid INSPIRE record id {:?}", id);
        }
        let url = format!("{}/literature/{}", self.api_base, id);
        let request = self.client.get(&url)?;
        let record = self
            .get_json(request, &url)
            .await
            .with_context(|| format!("Failed to fetch paper {} from INSPIRE", id))?;
        Ok(record_to_paper(&record))
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────

/// Convert an INSPIRE literature record into a `Paper`.
pub fn record_to_paper(record: &serde_json::Value) -> Paper {
    let meta = &record["metadata"];

    // `id` is a string in API responses; accept the numeric control number too
    let id = record["id"]
        .as_str()
        .map(String::from)
        .or_else(|| record["id"].as_u64().map(|n| n.to_string()))
        .or_else(|| meta["control_number"].as_u64().map(|n| n.to_string()))
        .unwrap_or_default();

    let title = meta["titles"][0]["title"]
        .as_str()
        .unwrap_or("Untitled")
        .to_string();

    let authors: Vec<String> = meta["authors"]
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|a| a["full_name"].as_str())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    let collaborations: Vec<String> = meta["collaborations"]
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|c| c["value"].as_str())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    let publication = &meta["publication_info"][0];
    let arxiv_id = meta["arxiv_eprints"][0]["value"].as_str().map(String::from);

    let year = publication["year"]
        .as_i64()
        .map(|y| y as i32)
        .or_else(|| meta["earliest_date"].as_str().and_then(year_of_date));

    let journal = publication["journal_title"]
        .as_str()
        .map(String::from)
        .or_else(|| arxiv_id.as_ref().map(|id| format!("arXiv:{}", id)))
        .unwrap_or_else(|| "Unknown".to_string());

    Paper {
        id,
        title,
        authors,
        collaborations,
        year,
        journal,
        affiliation: meta["authors"][0]["affiliations"][0]["value"]
            .as_str()
            .unwrap_or("")
            .to_string(),
        abstract_text: meta["abstracts"][0]["value"]
            .as_str()
            .unwrap_or("No abstract available")
            .to_string(),
        highlight: None,
        citation_count: meta["citation_count"].as_u64().unwrap_or(0),
        arxiv_id,
        doi: meta["dois"][0]["value"].as_str().map(String::from),
        document_type: meta["document_type"][0]
            .as_str()
            .unwrap_or("article")
            .to_string(),
        document_url: meta["documents"][0]["url"].as_str().map(String::from),
    }
}

/// Year of an INSPIRE date (`YYYY`, `YYYY-MM` or `YYYY-MM-DD`).
fn year_of_date(date: &str) -> Option<i32> {
    date.split('-').next()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn higgs_record() -> serde_json::Value {
        serde_json::json!({
            "id": "1124337",
            "created": "2012-07-31T00:00:00+00:00",
            "updated": "2024-01-01T00:00:00+00:00",
            "metadata": {
                "titles": [{ "title": "Observation of a new particle in the search for the Standard Model Higgs boson" }],
                "authors": [
                    { "full_name": "Aad, Georges", "affiliations": [{ "value": "CPPM, Marseille" }] },
                    { "full_name": "Abajyan, Tatevik" }
                ],
                "collaborations": [{ "value": "ATLAS" }],
                "abstracts": [{ "value": "A search for the Standard Model Higgs boson...", "source": "Elsevier" }],
                "publication_info": [{ "journal_title": "Phys.Lett.B", "journal_volume": "716", "year": 2012 }],
                "citation_count": 15000,
                "earliest_date": "2012-07-31",
                "arxiv_eprints": [{ "value": "1207.7214", "categories": ["hep-ex"] }],
                "dois": [{ "value": "10.1016/j.physletb.2012.08.020" }],
                "document_type": ["article"]
            }
        })
    }

    #[test]
    fn test_record_to_paper_full() {
        let p = record_to_paper(&higgs_record());
        assert_eq!(p.id, "1124337");
        assert!(p.title.starts_with("Observation of a new particle"));
        assert_eq!(p.authors, vec!["Aad, Georges", "Abajyan, Tatevik"]);
        assert_eq!(p.collaborations, vec!["ATLAS"]);
        assert_eq!(p.year, Some(2012));
        assert_eq!(p.journal, "Phys.Lett.B");
        assert_eq!(p.affiliation, "CPPM, Marseille");
        assert_eq!(p.citation_count, 15000);
        assert_eq!(p.arxiv_id.as_deref(), Some("1207.7214"));
        assert_eq!(p.doi.as_deref(), Some("10.1016/j.physletb.2012.08.020"));
        assert_eq!(p.document_type, "article");
        assert_eq!(p.highlight, None);
    }

    #[test]
    fn test_record_to_paper_fallbacks() {
        let record = serde_json::json!({
            "id": "42",
            "metadata": {
                "titles": [],
                "authors": [],
                "earliest_date": "2019-03",
                "arxiv_eprints": [{ "value": "1903.00001", "categories": ["hep-th"] }]
            }
        });
        let p = record_to_paper(&record);
        assert_eq!(p.title, "Untitled");
        assert_eq!(p.year, Some(2019));
        assert_eq!(p.journal, "arXiv:1903.00001");
        assert_eq!(p.abstract_text, "No abstract available");
        assert_eq!(p.citation_count, 0);
        assert_eq!(p.document_type, "article");
        assert!(p.collaborations.is_empty());
        assert_eq!(p.affiliation, "");
    }

    #[test]
    fn test_record_without_any_venue() {
        let record = serde_json::json!({ "id": 7, "metadata": { "titles": [{ "title": "T" }] } });
        let p = record_to_paper(&record);
        assert_eq!(p.id, "7");
        assert_eq!(p.journal, "Unknown");
        assert_eq!(p.year, None);
    }

    #[test]
    fn test_year_of_date() {
        assert_eq!(year_of_date("2012"), Some(2012));
        assert_eq!(year_of_date("2012-07-31"), Some(2012));
        assert_eq!(year_of_date("unknown"), None);
    }

    #[tokio::test]
    #[ignore = "Hits external INSPIRE API"]
    async fn test_inspire_fetch_higgs() {
        let client = InspireClient::new(Client::new().unwrap());
        let paper = client.fetch_by_id("1124337").await.unwrap();
        assert_eq!(paper.arxiv_id.as_deref(), Some("1207.7214"));
    }
}
