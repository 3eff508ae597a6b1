//! Configuration loading for hepscope.
//! Reads hepscope.toml from the current directory or the path in HEPSCOPE_CONFIG.

use serde::{Deserialize, Serialize};
use std::path::Path;

use hepscope_literature::authors::INSPIRE_BASE_URL;
use hepscope_literature::sources::inspire::INSPIRE_API_URL;
use hepscope_rag::backend::DEFAULT_AI_URL;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub inspire: InspireConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub pdf: PdfConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String { "127.0.0.1:3001".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspireConfig {
    /// REST API root, e.g. https://inspirehep.net/api
    #[serde(default = "default_inspire_api")]
    pub api_url: String,
    /// Site root used for links shown to the user.
    #[serde(default = "default_inspire_base")]
    pub base_url: String,
}

fn default_inspire_api()  -> String { INSPIRE_API_URL.to_string() }
fn default_inspire_base() -> String { INSPIRE_BASE_URL.to_string() }

impl Default for InspireConfig {
    fn default() -> Self {
        Self { api_url: default_inspire_api(), base_url: default_inspire_base() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_ai_url")]
    pub base_url: String,
}

fn default_ai_url() -> String { DEFAULT_AI_URL.to_string() }

impl Default for AiConfig {
    fn default() -> Self {
        Self { base_url: default_ai_url() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Hosts allowed in addition to INSPIRE, arXiv and localhost.
    #[serde(default)]
    pub allowed_domains: Vec<String>,
}

fn default_timeout_secs() -> u64 { 60 }

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: default_timeout_secs(), allowed_domains: Vec::new() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfConfig {
    /// Download the PDFs of every cited paper as soon as an answer arrives.
    #[serde(default = "bool_true")]
    pub prefetch: bool,
}

fn bool_true() -> bool { true }

impl Default for PdfConfig {
    fn default() -> Self {
        Self { prefetch: bool_true() }
    }
}

/// One hour without a request.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Sessions without a request for this long are closed and their PDFs freed.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_idle_timeout_secs()   -> u64 { DEFAULT_IDLE_TIMEOUT_SECS }
fn default_sweep_interval_secs() -> u64 { 60 }

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}


impl Config {
    /// Load configuration from hepscope.toml.
    /// Checks HEPSCOPE_CONFIG env var first, then current directory; a missing
    /// file means defaults. Environment overrides are applied last.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("HEPSCOPE_CONFIG")
            .unwrap_or_else(|_| "hepscope.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            Self::from_toml(&std::fs::read_to_string(&path)?)?
        } else {
            tracing::info!("No config file at {}, using defaults", path);
            Config::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = var("HEPSCOPE_BIND") {
            self.server.bind = bind;
        }
        if let Some(url) = var("HEPSCOPE_AI_URL") {
            self.ai.base_url = url;
        }
        if let Some(url) = var("HEPSCOPE_INSPIRE_URL") {
            self.inspire.api_url = url;
        }
    }
}
