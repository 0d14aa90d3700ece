//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the engine, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests with per-site timeouts and user agents
//! - Content-Type checks
//! - Error classification for the retry logic in the spider

use crate::config::UserAgentConfig;
use crate::engine::{EngineError, SiteBehavior};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use std::time::Duration;

/// Retrieves the HTML body of a single URL
///
/// This is the seam between the spider and the network; tests substitute an
/// in-memory implementation.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches one page and returns its decoded body
    async fn fetch(&self, url: &str, site: &SiteBehavior) -> Result<String, EngineError>;
}

/// Builds an HTTP client with proper configuration
///
/// The configured crawler identity is only a default; requests for a site
/// with its own user agent override it.
///
/// # Example
///
/// ```no_run
/// use mind_digest::config::UserAgentConfig;
/// use mind_digest::engine::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "MindDigestBot".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent_string())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`PageFetcher`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &UserAgentConfig) -> Result<Self, EngineError> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, site: &SiteBehavior) -> Result<String, EngineError> {
        let mut request = self.client.get(url).timeout(site.timeout);
        if !site.user_agent.is_empty() {
            request = request.header(USER_AGENT, site.user_agent.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.is_empty() && !content_type.contains("html") {
            return Err(EngineError::NotHtml {
                url: url.to_string(),
                content_type,
            });
        }

        response
            .text_with_charset(&site.charset)
            .await
            .map_err(|e| classify_error(url, e))
    }
}

fn classify_error(url: &str, error: reqwest::Error) -> EngineError {
    if error.is_timeout() {
        EngineError::Timeout {
            url: url.to_string(),
        }
    } else {
        EngineError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
