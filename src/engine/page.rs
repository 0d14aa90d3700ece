//! Fetched page model and HTML query helpers
//!
//! A [`Page`] wraps one parsed HTML document together with the instructions
//! a processor leaves for the engine: follow-up URLs and the skip flag.

use crate::engine::EngineError;
use scraper::{Html, Selector};
use url::Url;

/// Parses a CSS selector, reporting failures as [`EngineError::InvalidSelector`]
pub fn parse_selector(selector: &str) -> Result<Selector, EngineError> {
    Selector::parse(selector).map_err(|e| EngineError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// A fetched page as seen by a page processor
pub struct Page {
    url: Url,
    document: Html,
    target_requests: Vec<String>,
    skip: bool,
}

impl Page {
    /// Parses `body` as the page located at `url`
    pub fn new(url: &str, body: &str) -> Result<Self, EngineError> {
        let url = Url::parse(url).map_err(|e| EngineError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            url,
            document: Html::parse_document(body),
            target_requests: Vec::new(),
            skip: false,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    /// Returns true if any element matches `selector`
    pub fn matches(&self, selector: &Selector) -> bool {
        self.document.select(selector).next().is_some()
    }

    /// Trimmed text of the first matching element, if it has any text
    pub fn first_text(&self, selector: &Selector) -> Option<String> {
        self.document
            .select(selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Trimmed text of every matching element, skipping empty ones
    pub fn all_text(&self, selector: &Selector) -> Vec<String> {
        self.document
            .select(selector)
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// All followable links on the page as absolute URLs
    ///
    /// # Link Extraction Rules
    ///
    /// **Include:** `<a href="...">` tags, resolved against the page URL
    ///
    /// **Exclude:**
    /// - `<a href="..." download>`
    /// - `javascript:`, `mailto:`, `tel:` links
    /// - Data URIs and fragment-only links
    pub fn links(&self) -> Vec<String> {
        let mut links = Vec::new();

        if let Ok(a_selector) = Selector::parse("a[href]") {
            for element in self.document.select(&a_selector) {
                if element.value().attr("download").is_some() {
                    continue;
                }

                if let Some(href) = element.value().attr("href") {
                    if let Some(absolute_url) = resolve_link(href, &self.url) {
                        links.push(absolute_url);
                    }
                }
            }
        }

        links
    }

    /// Queues URLs for the engine to visit after this page
    pub fn add_target_requests<I>(&mut self, urls: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.target_requests.extend(urls);
    }

    pub fn target_requests(&self) -> &[String] {
        &self.target_requests
    }

    pub fn into_target_requests(self) -> Vec<String> {
        self.target_requests
    }

    /// Marks the page as excluded from results
    pub fn set_skip(&mut self, skip: bool) {
        self.skip = skip;
    }

    pub fn is_skipped(&self) -> bool {
        self.skip
    }
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
