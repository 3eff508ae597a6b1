//! Session-scoped PDF download cache with request coalescing.
//!
//! `PdfCache::get` downloads each URL at most once for the lifetime of the
//! cache. Concurrent callers for the same URL share one in-flight download:
//!
//! - cached URL      → the cached blob, no network access
//! - in-flight URL   → await the same download, then re-check the cache
//! - otherwise       → start a download and register it as in-flight
//!
//! Downloads run as spawned tasks, so a caller going away never cancels one.
//! Failures are reported through the [`Notifier`] and come back as `None`;
//! they are not remembered, so the next call retries.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use futures::future::{join_all, BoxFuture, FutureExt, Shared};
use hepscope_common::error::HepscopeError;
use hepscope_common::notify::Notifier;
use hepscope_common::sandbox::SandboxClient;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

const PDF_MAGIC: &[u8] = b"%PDF";

/// Downloaded PDF bytes, addressable by `id` until revoked.
#[derive(Debug)]
pub struct PdfBlob {
    id: Uuid,
    url: String,
    bytes: Vec<u8>,
    revoked: AtomicBool,
}

impl PdfBlob {
    pub fn new(url: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            bytes,
            revoked: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The PDF bytes, or `None` once the blob has been revoked.
    pub fn data(&self) -> Option<&[u8]> {
        if self.is_revoked() {
            None
        } else {
            Some(&self.bytes)
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked.load(Ordering::Acquire)
    }

    fn revoke(&self) {
        self.revoked.store(true, Ordering::Release);
    }
}

/// Network side of the cache.
#[async_trait]
pub trait PdfFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>>;
}

/// Downloads PDFs through the sandboxed HTTP client.
pub struct HttpPdfFetcher {
    client: SandboxClient,
}

impl HttpPdfFetcher {
    pub fn new(client: SandboxClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PdfFetcher for HttpPdfFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let resp = self.client.get(url)?.send().await?;
        if !resp.status().is_success() {
            return Err(HepscopeError::UpstreamStatus {
                status: resp.status().as_u16(),
                url: url.to_string(),
            }
            .into());
        }

        let bytes = resp.bytes().await?.to_vec();
        if !bytes.starts_with(PDF_MAGIC) {
            anyhow::bail!("Response from {} is not a PDF ({} bytes)", url, bytes.len());
        }
        debug!(bytes = bytes.len(), "Downloaded PDF");
        Ok(bytes)
    }
}

type PendingFetch = Shared<BoxFuture<'static, Option<Arc<PdfBlob>>>>;

#[derive(Default)]
struct CacheState {
    /// Bumped by `invalidate`; downloads started under an older generation
    /// never touch the maps again.
    generation: u64,
    blobs: HashMap<String, Arc<PdfBlob>>,
    pending: HashMap<String, PendingFetch>,
}

fn lock(state: &Mutex<CacheState>) -> MutexGuard<'_, CacheState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct PdfCache {
    state: Arc<Mutex<CacheState>>,
    fetcher: Arc<dyn PdfFetcher>,
    notifier: Notifier,
}

impl PdfCache {
    pub fn new(fetcher: Arc<dyn PdfFetcher>, notifier: Notifier) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState::default())),
            fetcher,
            notifier,
        }
    }

    /// Get a handle to the PDF at `url`, downloading it if needed.
    pub async fn get(&self, url: &str) -> Option<Arc<PdfBlob>> {
        self.get_in(url, None).await
    }

    /// `get`, unless the cache has been invalidated since `generation`.
    async fn get_in(&self, url: &str, generation: Option<u64>) -> Option<Arc<PdfBlob>> {
        let pending = {
            let mut state = lock(&self.state);
            if generation.is_some_and(|g| g != state.generation) {
                debug!(url, "Skipping PDF download for an invalidated generation");
                return None;
            }
            if let Some(blob) = state.blobs.get(url) {
                debug!(url, "PDF cache hit");
                return Some(Arc::clone(blob));
            }
            match state.pending.get(url).cloned() {
                Some(pending) => {
                    debug!(url, "Joining in-flight PDF download");
                    pending
                }
                None => self.start_fetch(&mut state, url),
            }
        };

        let result = pending.await;

        // The download may have been cached by another caller first.
        if let Some(blob) = lock(&self.state).blobs.get(url) {
            return Some(Arc::clone(blob));
        }
        result
    }

    /// Must be called with the state lock held so that registering the
    /// download is atomic with the cache miss.
    fn start_fetch(&self, state: &mut CacheState, url: &str) -> PendingFetch {
        let generation = state.generation;
        let fetcher = Arc::clone(&self.fetcher);
        let shared_state = Arc::clone(&self.state);
        let notifier = self.notifier.clone();
        let url_owned = url.to_string();

        debug!(url, generation, "Starting PDF download");
        let task = tokio::spawn(async move {
            let outcome = fetcher.fetch(&url_owned).await;

            let mut state = lock(&shared_state);
            let current = state.generation == generation;
            if current {
                state.pending.remove(&url_owned);
            }

            match outcome {
                Ok(bytes) => {
                    let blob = Arc::new(PdfBlob::new(url_owned.clone(), bytes));
                    if current {
                        state.blobs.insert(url_owned, Arc::clone(&blob));
                    } else {
                        debug!(url = %url_owned, "Discarding PDF downloaded before invalidation");
                    }
                    Some(blob)
                }
                Err(e) => {
                    drop(state);
                    warn!(url = %url_owned, error = %e, "PDF download failed");
                    notifier.error("Failed to fetch PDF");
                    None
                }
            }
        });

        let pending: PendingFetch = task
            .map(|joined| joined.ok().flatten())
            .boxed()
            .shared();
        state.pending.insert(url.to_string(), pending.clone());
        pending
    }

    /// Current invalidation generation, for [`PdfCache::prefetch`].
    pub fn generation(&self) -> u64 {
        lock(&self.state).generation
    }

    /// Download every URL concurrently, ignoring the results.
    ///
    /// URLs are only requested while the cache is still at `generation`, so a
    /// prefetch for an answer that has since been replaced adds nothing.
    pub async fn prefetch<I, S>(&self, generation: u64, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls: Vec<S> = urls.into_iter().collect();
        let fetched = join_all(urls.iter().map(|u| self.get_in(u.as_ref(), Some(generation)))).await;
        debug!(
            requested = fetched.len(),
            ok = fetched.iter().filter(|b| b.is_some()).count(),
            "PDF prefetch finished"
        );
    }

    /// Cached handle for `url`, without touching the network.
    pub fn cached(&self, url: &str) -> Option<Arc<PdfBlob>> {
        lock(&self.state).blobs.get(url).cloned()
    }

    pub fn is_pending(&self, url: &str) -> bool {
        lock(&self.state).pending.contains_key(url)
    }

    pub fn len(&self) -> usize {
        lock(&self.state).blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pending_len(&self) -> usize {
        lock(&self.state).pending.len()
    }

    /// Revoke every issued handle and forget all cached and in-flight URLs.
    ///
    /// Downloads still running are not aborted; their results are handed to
    /// whoever awaits them but are not cached.
    pub fn invalidate(&self) {
        let mut state = lock(&self.state);
        state.generation += 1;
        for blob in state.blobs.values() {
            blob.revoke();
        }
        let released = state.blobs.len();
        let abandoned = state.pending.len();
        state.blobs.clear();
        state.pending.clear();
        info!(released, abandoned, "PDF cache invalidated");
    }
}
