//! INSPIRE client and PDF fetcher against an in-process HTTP server.
//!
//! Run with: cargo test --package hepscope-literature --test test_inspire_client

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use hepscope_common::sandbox::SandboxClient;
use hepscope_literature::pdf_cache::{HttpPdfFetcher, PdfFetcher};
use hepscope_literature::sources::inspire::InspireClient;
use hepscope_literature::sources::{LiteratureSource, SearchParams, SortOrder};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::net::TcpListener;

async fn literature(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!({
        "hits": {
            "total": 2,
            "hits": [
                {
                    "id": "1124337",
                    "metadata": {
                        "titles": [{ "title": "Observation of a new particle" }],
                        "collaborations": [{ "value": "ATLAS" }],
                        "publication_info": [{ "journal_title": "Phys.Lett.B", "year": 2012 }],
                        "arxiv_eprints": [{ "value": "1207.7214" }],
                        "citation_count": 15000
                    }
                },
                {
                    "id": "2000",
                    "metadata": { "earliest_date": "2023-05-01" }
                }
            ]
        },
        "links": { "next": format!("page={}", params.get("page").cloned().unwrap_or_default()) }
    }))
}

async fn record(Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
    if id == "1" {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!({ "id": id, "metadata": { "titles": [{ "title": "Single" }] } })))
}

async fn start_server() -> String {
    let app = Router::new()
        .route("/api/literature", get(literature))
        .route("/api/literature/{id}", get(record))
        .route("/files/ok.pdf", get(|| async { b"%PDF-1.5 body".to_vec() }))
        .route("/files/page.pdf", get(|| async { "<html>login</html>" }))
        .route("/files/gone.pdf", get(|| async { StatusCode::GONE }));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_search_sends_params_and_converts_hits() {
    let base = start_server().await;
    let client = InspireClient::new(SandboxClient::new().unwrap()).with_api_base(&format!("{base}/api/"));

    let params = SearchParams {
        size: Some(2),
        page: Some(3),
        sort: Some(SortOrder::MostCited),
        ..SearchParams::query("higgs")
    };
    let page = client.search(&params).await.unwrap();

    assert_eq!(page.total, 2);
    assert_eq!(page.next.as_deref(), Some("page=3"));
    assert_eq!(page.papers[0].id, "1124337");
    assert_eq!(page.papers[0].collaborations, vec!["ATLAS".to_string()]);
    assert_eq!(page.papers[0].citation_count, 15000);
    assert_eq!(page.papers[1].title, "Untitled");
    assert_eq!(page.papers[1].year, Some(2023));
}

#[tokio::test]
async fn test_fetch_by_id_and_missing_record() {
    let base = start_server().await;
    let client = InspireClient::new(SandboxClient::new().unwrap()).with_api_base(&format!("{base}/api"));

    assert_eq!(client.fetch_by_id("42").await.unwrap().title, "Single");
    let err = client.fetch_by_id("1").await.unwrap_err();
    assert!(format!("{:#}", err).contains("404"));
}

#[tokio::test]
async fn test_fetch_by_id_rejects_non_numeric_ids() {
    let base = start_server().await;
    let client = InspireClient::new(SandboxClient::new().unwrap()).with_api_base(&format!("{base}/api"));

    for id in ["../authors/1", "42?q=x", ""] {
        let err = client.fetch_by_id(id).await.unwrap_err();
        assert!(err.to_string().contains("Invalid INSPIRE record id"), "{id}: {err}");
    }
}

#[tokio::test]
async fn test_pdf_fetcher_checks_status_and_magic() {
    let base = start_server().await;
    let fetcher = HttpPdfFetcher::new(SandboxClient::new().unwrap());

    assert!(fetcher.fetch(&format!("{base}/files/ok.pdf")).await.unwrap().starts_with(b"%PDF"));
    assert!(fetcher.fetch(&format!("{base}/files/page.pdf")).await.is_err());
    assert!(fetcher.fetch(&format!("{base}/files/gone.pdf")).await.is_err());
}

#[tokio::test]
async fn test_pdf_fetcher_respects_allowlist() {
    let fetcher = HttpPdfFetcher::new(SandboxClient::new().unwrap());
    let err = fetcher.fetch("https://example.com/paper.pdf").await.unwrap_err();
    assert!(err.to_string().contains("example.com"));
}
