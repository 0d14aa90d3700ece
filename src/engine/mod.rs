//! Fetch engine used by crawler adapters
//!
//! This module contains the page-fetching side of a crawl, including:
//! - HTTP fetching with per-site timeouts and retries
//! - HTML parsing and selector helpers for extraction strategies
//! - Breadth-first traversal from a single seed with a bounded worker count
//!
//! The engine never interprets page content itself. Every fetched page is
//! handed to a [`PageProcessor`], which decides what to extract and which
//! links to follow.

mod fetcher;
mod page;
mod spider;

pub use fetcher::{build_http_client, HttpFetcher, PageFetcher};
pub use page::{parse_selector, Page};
pub use spider::{CrawlStats, Spider};

use std::time::Duration;
use thiserror::Error;

/// Errors raised inside the fetch engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Expected HTML from {url}, got {content_type}")]
    NotHtml { url: String, content_type: String },

    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Page processor failed on {url}")]
    Processor { url: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl EngineError {
    /// Returns true if a retry could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Http { source, .. } => source.is_connect() || source.is_request(),
            _ => false,
        }
    }
}

/// Per-site fetch behavior: politeness, retry, and identification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteBehavior {
    /// Additional attempts after the first failed fetch
    pub retry_times: u32,

    /// Delay between requests and between retries
    pub sleep: Duration,

    /// Request timeout
    pub timeout: Duration,

    /// Charset used when the response does not declare one
    pub charset: String,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for SiteBehavior {
    fn default() -> Self {
        Self {
            retry_times: 3,
            sleep: Duration::from_millis(1000),
            timeout: Duration::from_millis(10_000),
            charset: "utf-8".to_string(),
            user_agent: "Mozilla/5.0 (compatible; MindDigestBot/1.0)".to_string(),
        }
    }
}

/// Callback invoked by the [`Spider`] for every fetched page
///
/// Implementations inspect the page, record whatever they extract, and
/// queue follow-up URLs with [`Page::add_target_requests`].
pub trait PageProcessor: Send {
    /// Processes one fetched page
    fn process(&mut self, page: &mut Page);

    /// Fetch behavior the engine should use for this site
    fn site(&self) -> &SiteBehavior;
}
