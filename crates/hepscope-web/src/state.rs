//! Shared application state for the web server.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use hepscope_common::error::ApiError;
use hepscope_common::sandbox::SandboxClient;
use hepscope_literature::pdf_cache::{HttpPdfFetcher, PdfFetcher};
use hepscope_literature::sources::inspire::InspireClient;
use hepscope_literature::sources::LiteratureSource;
use hepscope_rag::backend::{HttpRagBackend, RagBackend};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::config::{Config, DEFAULT_IDLE_TIMEOUT_SECS};
use crate::session::{ResearchSession, SessionDeps};

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub literature: Arc<dyn LiteratureSource>,
    /// Site root for links back to INSPIRE.
    pub inspire_base_url: String,
    deps: SessionDeps,
    /// Sessions untouched for this long are closed by the sweeper.
    idle_timeout: Duration,
    sessions: RwLock<HashMap<Uuid, Arc<ResearchSession>>>,
}

impl AppState {
    /// Wire the real INSPIRE and AI clients from configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let mut client = SandboxClient::with_timeout(Duration::from_secs(config.http.timeout_secs))?;
        for domain in &config.http.allowed_domains {
            client.allow_domain(domain);
        }

        let literature: Arc<dyn LiteratureSource> =
            Arc::new(InspireClient::new(client.clone()).with_api_base(&config.inspire.api_url));
        let rag: Arc<dyn RagBackend> = Arc::new(HttpRagBackend::new(&config.ai.base_url, client.clone()));
        let fetcher: Arc<dyn PdfFetcher> = Arc::new(HttpPdfFetcher::new(client));

        Ok(Self::new(
            literature,
            rag,
            fetcher,
            config.inspire.base_url.clone(),
            config.pdf.prefetch,
        )
        .with_idle_timeout(Duration::from_secs(config.session.idle_timeout_secs)))
    }

    pub fn new(
        literature: Arc<dyn LiteratureSource>,
        rag: Arc<dyn RagBackend>,
        fetcher: Arc<dyn PdfFetcher>,
        inspire_base_url: String,
        prefetch: bool,
    ) -> Self {
        Self {
            literature: Arc::clone(&literature),
            inspire_base_url,
            deps: SessionDeps { rag, literature, fetcher, prefetch },
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub async fn create_session(&self) -> Arc<ResearchSession> {
        let session = Arc::new(ResearchSession::new(self.deps.clone()));
        self.sessions.write().await.insert(session.id, Arc::clone(&session));
        tracing::info!(session = %session.id, "Session created");
        session
    }

    /// Look up a session and mark it active.
    pub async fn session(&self, id: Uuid) -> Result<Arc<ResearchSession>, ApiError> {
        let session = self
            .sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Unknown session {}", id)))?;
        session.touch();
        Ok(session)
    }

    pub async fn remove_session(&self, id: Uuid) -> Result<(), ApiError> {
        let session = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| ApiError::NotFound(format!("Unknown session {}", id)))?;
        session.close().await;
        tracing::info!(session = %id, "Session closed");
        Ok(())
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Close every session idle for at least the configured timeout.
    /// Returns how many were removed.
    pub async fn expire_idle_sessions(&self) -> usize {
        let expired: Vec<Arc<ResearchSession>> = {
            let mut sessions = self.sessions.write().await;
            let ids: Vec<Uuid> = sessions
                .values()
                .filter(|s| s.idle_for() >= self.idle_timeout)
                .map(|s| s.id)
                .collect();
            ids.iter().filter_map(|id| sessions.remove(id)).collect()
        };

        for session in &expired {
            session.close().await;
            tracing::info!(session = %session.id, "Idle session expired");
        }
        expired.len()
    }

    /// Run [`AppState::expire_idle_sessions`] every `every` until the state
    /// is dropped.
    pub fn spawn_session_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let state: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(state) = state.upgrade() else {
                    break;
                };
                let expired = state.expire_idle_sessions().await;
                if expired > 0 {
                    tracing::debug!(expired, "Session sweep finished");
                }
            }
        })
    }
}

pub type SharedState = Arc<AppState>;
