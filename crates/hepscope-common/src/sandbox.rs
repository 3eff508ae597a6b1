use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use crate::error::HepscopeError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// An HTTP client that only allows requests to approved domains.
///
/// Every outbound request (INSPIRE metadata, RAG queries, feedback, PDF
/// downloads) goes through this client so the set of hosts the server will
/// contact on a user's behalf is fixed by configuration.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SandboxClient {
    /// Creates a client with the default allowlist and a 30 second timeout.
    pub fn new() -> Result<Self, HepscopeError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, HepscopeError> {
        let mut allowlist = HashSet::new();
        let domains = [
            "inspirehep.net",   // INSPIRE API, RAG service, documents
            "inspirebeta.net",  // INSPIRE staging
            "arxiv.org",        // arXiv PDFs
            "localhost",        // Local RAG service
            "127.0.0.1",        // Localhost alt
        ];

        for d in domains {
            allowlist.insert(d.to_string());
        }

        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("hepscope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HepscopeError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, allowlist })
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Validates if a URL is permitted under the current sandbox policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                // Exact match or a subdomain of an allowed domain
                for allowed in &self.allowlist {
                    if host == allowed || host.ends_with(&format!(".{}", allowed)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn check(&self, url: &str) -> Result<(), HepscopeError> {
        if !self.is_allowed(url) {
            return Err(HepscopeError::SecurityError(format!(
                "domain not in allowlist for URL {}",
                url
            )));
        }
        Ok(())
    }

    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, HepscopeError> {
        self.check(url)?;
        Ok(self.client.get(url))
    }

    pub fn post(&self, url: &str) -> Result<reqwest::RequestBuilder, HepscopeError> {
        self.check(url)?;
        Ok(self.client.post(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allowlist() {
        let client = SandboxClient::new().unwrap();
        assert!(client.is_allowed("https://inspirehep.net/api/literature/1"));
        assert!(client.is_allowed("https://export.arxiv.org/pdf/1207.7214"));
        assert!(client.is_allowed("http://127.0.0.1:8080/v1/query-rag"));
        assert!(!client.is_allowed("https://evil-inspirehep.net/"));
        assert!(!client.is_allowed("not a url"));
    }

    #[test]
    fn test_allow_domain_and_blocked_request() {
        let mut client = SandboxClient::new().unwrap();
        assert!(client.get("https://cds.cern.ch/record/1").is_err());
        client.allow_domain("cds.cern.ch");
        assert!(client.get("https://cds.cern.ch/record/1").is_ok());
    }
}
