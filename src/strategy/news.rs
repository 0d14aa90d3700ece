//! News-site extraction strategy
//!
//! News sites share one shape: listing pages link to article pages whose
//! URLs look like `https://www.<domain>/news/<slug>/<id>`. Only the CSS
//! selectors for the article fields differ between sites, so one strategy
//! type covers all of them, parameterized by a [`NewsSiteProfile`].
//!
//! # Page handling
//!
//! 1. **Classify**: URLs not matching the article pattern are listing pages.
//!    Matching links are queued and the page is skipped.
//! 2. **Gate**: articles behind the paywall are skipped.
//! 3. **Extract**: title, paragraphs, author (with a fallback selector).
//! 4. **Validate**: a missing title or an empty body skips the page.
//! 5. **Emit**: the entry is appended to the result buffer.

use crate::engine::{parse_selector, Page, PageProcessor, SiteBehavior};
use crate::entry::{DigestEntry, MAX_AUTHOR_LEN, MAX_SUMMARY_LEN, MAX_TITLE_LEN};
use crate::strategy::ExtractionStrategy;
use crate::url::normalize_domain;
use crate::DigestError;
use regex::Regex;
use scraper::Selector;
use std::collections::HashSet;

/// CSS selectors locating the article fields on one site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewsSelectors {
    /// Matches only on paywalled articles
    pub paywall: &'static str,
    pub title: &'static str,
    /// Every paragraph of the free article body
    pub paragraphs: &'static str,
    pub author: &'static str,
    /// Used when `author` has no text
    pub author_fallback: &'static str,
}

/// Static description of one news site
#[derive(Debug, Clone)]
pub struct NewsSiteProfile {
    pub name: &'static str,
    pub domain: &'static str,
    pub adapter_kind: Option<&'static str>,
    pub selectors: NewsSelectors,
    pub site: SiteBehavior,
}

struct CompiledSelectors {
    paywall: Selector,
    title: Selector,
    paragraphs: Selector,
    author: Selector,
    author_fallback: Selector,
}

impl CompiledSelectors {
    fn compile(selectors: &NewsSelectors) -> Result<Self, DigestError> {
        Ok(Self {
            paywall: parse_selector(selectors.paywall)?,
            title: parse_selector(selectors.title)?,
            paragraphs: parse_selector(selectors.paragraphs)?,
            author: parse_selector(selectors.author)?,
            author_fallback: parse_selector(selectors.author_fallback)?,
        })
    }
}

/// Article URL matchers for the domain of the current crawl
struct ArticlePattern {
    /// Whole-URL match used to classify pages
    full: Regex,
    /// Unanchored match used to pick article links out of listings
    link: Regex,
}

impl ArticlePattern {
    fn for_domain(domain: &str) -> Result<Self, DigestError> {
        let body = format!(
            r"https://www\.{}/news/.+?/\d+",
            regex::escape(&normalize_domain(domain))
        );

        let compile = |pattern: String| {
            Regex::new(&pattern).map_err(|e| {
                DigestError::Configuration(format!("invalid article pattern for {}: {}", domain, e))
            })
        };

        Ok(Self {
            full: compile(format!("^{}$", body))?,
            link: compile(body)?,
        })
    }
}

/// Extraction strategy for sites following the news URL layout
pub struct NewsArticleStrategy {
    profile: NewsSiteProfile,
    selectors: CompiledSelectors,
    pattern: Option<ArticlePattern>,
    results: Vec<DigestEntry>,
}

impl NewsArticleStrategy {
    /// Creates a strategy for `profile`, failing on malformed selectors
    pub fn new(profile: NewsSiteProfile) -> Result<Self, DigestError> {
        let selectors = CompiledSelectors::compile(&profile.selectors)?;
        Ok(Self {
            profile,
            selectors,
            pattern: None,
            results: Vec::new(),
        })
    }

    fn extract(&self, page: &Page) -> Option<DigestEntry> {
        let title = page.first_text(&self.selectors.title)?;

        let summary = page
            .all_text(&self.selectors.paragraphs)
            .join("\n")
            .trim()
            .to_string();
        if summary.is_empty() {
            return None;
        }

        let author = page
            .first_text(&self.selectors.author)
            .or_else(|| page.first_text(&self.selectors.author_fallback))
            .unwrap_or_default();

        Some(DigestEntry::new(
            truncate_chars(title, MAX_TITLE_LEN),
            truncate_chars(summary, MAX_SUMMARY_LEN),
            truncate_chars(author, MAX_AUTHOR_LEN),
            page.url().as_str(),
        ))
    }
}

/// Cuts `text` to at most `max` characters
fn truncate_chars(mut text: String, max: usize) -> String {
    if let Some((idx, _)) = text.char_indices().nth(max) {
        text.truncate(idx);
    }
    text
}

impl PageProcessor for NewsArticleStrategy {
    fn process(&mut self, page: &mut Page) {
        let Some(pattern) = &self.pattern else {
            tracing::warn!("{} received a page before init: {}", self.profile.name, page.url());
            page.set_skip(true);
            return;
        };

        if !pattern.full.is_match(page.url().as_str()) {
            let mut seen = HashSet::new();
            let targets: Vec<String> = page
                .links()
                .iter()
                .filter_map(|link| pattern.link.find(link))
                .map(|m| m.as_str().to_string())
                .filter(|url| seen.insert(url.clone()))
                .collect();

            tracing::trace!(
                "{}: {} article links on {}",
                self.profile.name,
                targets.len(),
                page.url()
            );
            page.add_target_requests(targets);
            page.set_skip(true);
            return;
        }

        if page.matches(&self.selectors.paywall) {
            tracing::debug!("Skipping paywalled article {}", page.url());
            page.set_skip(true);
            return;
        }

        match self.extract(page) {
            Some(entry) => {
                tracing::debug!("Extracted \"{}\" from {}", entry.title, entry.source_url);
                self.results.push(entry);
            }
            None => {
                tracing::debug!("Missing title or body on {}, skipping", page.url());
                page.set_skip(true);
            }
        }
    }

    fn site(&self) -> &SiteBehavior {
        &self.profile.site
    }
}

impl ExtractionStrategy for NewsArticleStrategy {
    fn name(&self) -> &'static str {
        self.profile.name
    }

    fn domain(&self) -> &str {
        self.profile.domain
    }

    fn adapter_kind(&self) -> Option<&'static str> {
        self.profile.adapter_kind
    }

    fn init(&mut self, domain: &str, start_url: &str) -> Result<(), DigestError> {
        self.pattern = Some(ArticlePattern::for_domain(domain)?);
        self.results.clear();
        tracing::debug!("{} initialized for {} at {}", self.profile.name, domain, start_url);
        Ok(())
    }

    fn results(&self) -> Vec<DigestEntry> {
        self.results.clone()
    }
}
