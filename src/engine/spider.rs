//! Breadth-first spider driving a page processor
//!
//! The spider starts from one seed URL, fetches up to `workers` pages at a
//! time, and hands each fetched page to the processor. URLs the processor
//! queues are visited once each.

use crate::engine::{EngineError, Page, PageFetcher, PageProcessor, SiteBehavior};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{HashSet, VecDeque};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use url::Url;

/// Counters for one spider run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Pages fetched and handed to the processor
    pub pages_fetched: usize,

    /// Pages whose fetch failed after all retries
    pub pages_failed: usize,

    /// Pages the processor marked as skipped
    pub pages_skipped: usize,
}

/// Single-seed crawl engine with bounded fetch concurrency
pub struct Spider {
    fetcher: Arc<dyn PageFetcher>,
    workers: usize,
}

impl Spider {
    /// Creates a spider fetching at most `workers` pages concurrently
    pub fn new(fetcher: Arc<dyn PageFetcher>, workers: usize) -> Self {
        Self {
            fetcher,
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Crawls from `seed`, feeding every fetched page to `processor`
    ///
    /// Fetch failures are logged and counted; they never stop the crawl.
    /// An invalid seed URL or a panicking processor ends the run with an
    /// error, leaving whatever the processor already recorded in place.
    pub async fn run<P>(&self, seed: &str, processor: &mut P) -> Result<CrawlStats, EngineError>
    where
        P: PageProcessor + ?Sized,
    {
        let seed = Url::parse(seed)
            .map_err(|e| EngineError::InvalidUrl {
                url: seed.to_string(),
                message: e.to_string(),
            })?
            .to_string();

        let site = processor.site().clone();
        let mut stats = CrawlStats::default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut frontier: VecDeque<String> = VecDeque::new();
        seen.insert(seed.clone());
        frontier.push_back(seed);

        let mut in_flight = FuturesUnordered::new();

        loop {
            while in_flight.len() < self.workers {
                match frontier.pop_front() {
                    Some(url) => in_flight.push(self.fetch_with_retry(url, &site)),
                    None => break,
                }
            }

            let Some((url, result)) = in_flight.next().await else {
                break;
            };

            let body = match result {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!("Failed to fetch {}: {}", url, e);
                    stats.pages_failed += 1;
                    continue;
                }
            };

            stats.pages_fetched += 1;
            let (skipped, targets) = match process_page(processor, &url, &body) {
                Ok(outcome) => outcome,
                Err(EngineError::InvalidUrl { url, message }) => {
                    tracing::warn!("Skipping unparseable URL {}: {}", url, message);
                    continue;
                }
                Err(e) => return Err(e),
            };

            if skipped {
                stats.pages_skipped += 1;
            }

            for target in targets {
                if seen.insert(target.clone()) {
                    frontier.push_back(target);
                }
            }
        }

        tracing::debug!(
            "Spider finished: {} fetched, {} failed, {} skipped",
            stats.pages_fetched,
            stats.pages_failed,
            stats.pages_skipped
        );

        Ok(stats)
    }

    /// Fetches a URL, retrying transient failures per the site behavior
    async fn fetch_with_retry(
        &self,
        url: String,
        site: &SiteBehavior,
    ) -> (String, Result<String, EngineError>) {
        let mut attempt = 0;
        loop {
            let result = self.fetcher.fetch(&url, site).await;

            match result {
                Err(e) if e.is_transient() && attempt < site.retry_times => {
                    attempt += 1;
                    tracing::debug!(
                        "Retrying {} (attempt {}/{}): {}",
                        url,
                        attempt,
                        site.retry_times,
                        e
                    );
                    tokio::time::sleep(site.sleep).await;
                }
                other => {
                    if !site.sleep.is_zero() {
                        tokio::time::sleep(site.sleep).await;
                    }
                    return (url, other);
                }
            }
        }
    }
}

/// Parses and processes one page, returning its skip flag and queued URLs
///
/// The parsed document is not `Send`, so it must never live across an
/// await point in the spider loop.
fn process_page<P>(processor: &mut P, url: &str, body: &str) -> Result<(bool, Vec<String>), EngineError>
where
    P: PageProcessor + ?Sized,
{
    let mut page = Page::new(url, body)?;

    catch_unwind(AssertUnwindSafe(|| processor.process(&mut page))).map_err(|_| {
        EngineError::Processor {
            url: url.to_string(),
        }
    })?;

    let skipped = page.is_skipped();
    Ok((skipped, page.into_target_requests()))
}
