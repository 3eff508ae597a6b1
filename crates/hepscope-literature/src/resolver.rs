//! Citation resolution: RAG citation map → one formatted citation per paper.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use futures::future::join_all;
use hepscope_common::notify::Notifier;
use tracing::{debug, warn};

use crate::models::{Citation, FormattedCitation};
use crate::sources::LiteratureSource;

/// Citations grouped by backing paper, in order of first appearance.
struct PaperGroup {
    control_number: u64,
    display: u32,
    snippets: Vec<String>,
}

fn group_by_paper(citations: &BTreeMap<u32, Citation>) -> Vec<PaperGroup> {
    let mut groups: Vec<PaperGroup> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();

    for citation in citations.values() {
        match index.get(&citation.control_number) {
            Some(&i) => groups[i].snippets.push(citation.snippet.clone()),
            None => {
                index.insert(citation.control_number, groups.len());
                groups.push(PaperGroup {
                    control_number: citation.control_number,
                    display: citation.doc_id,
                    snippets: vec![citation.snippet.clone()],
                });
            }
        }
    }
    groups
}

pub struct CitationResolver {
    source: Arc<dyn LiteratureSource>,
    notifier: Notifier,
}

impl CitationResolver {
    pub fn new(source: Arc<dyn LiteratureSource>, notifier: Notifier) -> Self {
        Self { source, notifier }
    }

    /// Fetch every distinct cited paper in parallel.
    ///
    /// A paper that cannot be fetched is reported and left out; the rest of
    /// the list is unaffected.
    pub async fn resolve(&self, citations: &BTreeMap<u32, Citation>) -> Vec<FormattedCitation> {
        let groups = group_by_paper(citations);
        debug!(citations = citations.len(), papers = groups.len(), "Resolving citations");

        let lookups = groups.into_iter().map(|group| async move {
            let id = group.control_number.to_string();
            match self.source.fetch_by_id(&id).await {
                Ok(paper) => {
                    let highlight = group.snippets[0].clone();
                    Some(FormattedCitation {
                        id: group.control_number,
                        display: group.display,
                        paper: paper.with_highlight(highlight),
                        snippets: group.snippets,
                    })
                }
                Err(e) => {
                    warn!(paper = %id, error = %e, "Citation resolution failed");
                    self.notifier.error(format!("Failed to fetch paper {}", id));
                    None
                }
            }
        });

        join_all(lookups).await.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{sample_paper, Paper};
    use crate::sources::{SearchPage, SearchParams};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSource {
        missing: Vec<String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LiteratureSource for FakeSource {
        async fn search(&self, _params: &SearchParams) -> anyhow::Result<SearchPage> {
            Ok(SearchPage { total: 0, papers: vec![], next: None })
        }

        async fn fetch_by_id(&self, id: &str) -> anyhow::Result<Paper> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.missing.iter().any(|m| m == id) {
                anyhow::bail!("404 for {}", id);
            }
            Ok(sample_paper(id))
        }
    }

    fn citation(doc_id: u32, control_number: u64, snippet: &str) -> Citation {
        Citation { doc_id, control_number, snippet: snippet.to_string() }
    }

    fn resolver(missing: &[&str]) -> (CitationResolver, Arc<FakeSource>, Notifier) {
        let source = Arc::new(FakeSource {
            missing: missing.iter().map(|s| s.to_string()).collect(),
            calls: AtomicUsize::new(0),
        });
        let notifier = Notifier::default();
        (CitationResolver::new(source.clone(), notifier.clone()), source, notifier)
    }

    #[tokio::test]
    async fn test_snippets_for_same_paper_are_merged_in_order() {
        let (resolver, source, _) = resolver(&[]);
        let citations = BTreeMap::from([
            (0, citation(1, 100, "A")),
            (1, citation(2, 200, "other")),
            (2, citation(3, 100, "B")),
        ]);

        let formatted = resolver.resolve(&citations).await;

        assert_eq!(formatted.len(), 2);
        assert_eq!(formatted[0].id, 100);
        assert_eq!(formatted[0].display, 1);
        assert_eq!(formatted[0].snippets, vec!["A", "B"]);
        assert_eq!(formatted[0].paper.highlight.as_deref(), Some("A"));
        assert_eq!(formatted[1].id, 200);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_paper_is_dropped_and_reported() {
        let (resolver, _, notifier) = resolver(&["200"]);
        let mut rx = notifier.subscribe();
        let citations = BTreeMap::from([
            (0, citation(1, 100, "A")),
            (1, citation(2, 200, "B")),
            (2, citation(3, 300, "C")),
        ]);

        let formatted = resolver.resolve(&citations).await;

        let ids: Vec<u64> = formatted.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![100, 300]);
        assert_eq!(rx.recv().await.unwrap().message, "Failed to fetch paper 200");
    }

    #[tokio::test]
    async fn test_numeric_key_order() {
        let (resolver, _, _) = resolver(&[]);
        // BTreeMap<u32, _> keeps 2 before 10, as the answer numbers them
        let citations = BTreeMap::from([
            (10, citation(11, 1, "late")),
            (2, citation(3, 2, "early")),
        ]);
        let formatted = resolver.resolve(&citations).await;
        assert_eq!(formatted[0].id, 2);
        assert_eq!(formatted[1].id, 1);
    }

    #[tokio::test]
    async fn test_empty_citations() {
        let (resolver, source, _) = resolver(&[]);
        assert!(resolver.resolve(&BTreeMap::new()).await.is_empty());
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }
}
