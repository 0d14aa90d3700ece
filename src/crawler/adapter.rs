//! Crawler trait and the spider-backed adapter
//!
//! A crawler couples one extraction strategy with the crawl engine. The
//! coordinator only sees the [`Crawler`] trait; which engine runs underneath
//! is decided by the adapter kind the strategy declares.

use crate::engine::{PageFetcher, Spider};
use crate::entry::DigestEntry;
use crate::strategy::ExtractionStrategy;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Adapter kind driving strategies with the breadth-first [`Spider`]
pub const SPIDER_ADAPTER: &str = "spider";

/// Crawls one site and returns the entries its strategy extracted
#[async_trait]
pub trait Crawler: Send + Sync {
    /// Prepares a crawl of `domain` seeded at `start_url`
    async fn init(&self, domain: &str, start_url: &str) -> Result<()>;

    /// Runs the crawl and returns everything collected
    ///
    /// Engine failures end the crawl early but never surface here; the
    /// entries gathered before the failure are returned instead.
    async fn crawl(&self) -> Vec<DigestEntry>;

    /// Initializes and crawls as one step
    ///
    /// Implementations shared between several sites must not let another
    /// `init` land between the two halves.
    async fn run(&self, domain: &str, start_url: &str) -> Result<Vec<DigestEntry>> {
        self.init(domain, start_url).await?;
        Ok(self.crawl().await)
    }

    /// Adapter kind this crawler was built as
    fn kind(&self) -> &'static str;
}

struct AdapterState {
    strategy: Box<dyn ExtractionStrategy>,
    start_url: Option<String>,
}

/// [`Crawler`] running an extraction strategy on the [`Spider`] engine
pub struct SpiderAdapter {
    spider: Spider,
    state: Mutex<AdapterState>,
}

impl SpiderAdapter {
    /// Binds `strategy` to a spider fetching with `threads` workers
    pub fn new(
        strategy: Box<dyn ExtractionStrategy>,
        fetcher: Arc<dyn PageFetcher>,
        threads: usize,
    ) -> Self {
        Self {
            spider: Spider::new(fetcher, threads),
            state: Mutex::new(AdapterState {
                strategy,
                start_url: None,
            }),
        }
    }

    pub fn threads(&self) -> usize {
        self.spider.workers()
    }
}

impl SpiderAdapter {
    fn prepare(state: &mut AdapterState, domain: &str, start_url: &str) -> Result<()> {
        state.strategy.init(domain, start_url)?;
        state.start_url = Some(start_url.to_string());
        Ok(())
    }

    async fn run_spider(&self, state: &mut AdapterState) -> Vec<DigestEntry> {
        let name = state.strategy.name();

        let Some(start_url) = state.start_url.clone() else {
            tracing::warn!("{} crawled before init, nothing to do", name);
            return state.strategy.results();
        };

        tracing::info!("Crawling {} with {} ({} workers)", start_url, name, self.spider.workers());

        match self.spider.run(&start_url, state.strategy.as_mut()).await {
            Ok(stats) => {
                tracing::info!(
                    "{} finished {}: {} pages fetched, {} failed",
                    name,
                    start_url,
                    stats.pages_fetched,
                    stats.pages_failed
                );
            }
            Err(e) => {
                tracing::error!("{} stopped early on {}: {}", name, start_url, e);
            }
        }

        state.strategy.results()
    }
}

#[async_trait]
impl Crawler for SpiderAdapter {
    async fn init(&self, domain: &str, start_url: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        Self::prepare(&mut state, domain, start_url)
    }

    async fn crawl(&self) -> Vec<DigestEntry> {
        let mut state = self.state.lock().await;
        self.run_spider(&mut state).await
    }

    async fn run(&self, domain: &str, start_url: &str) -> Result<Vec<DigestEntry>> {
        let mut state = self.state.lock().await;
        Self::prepare(&mut state, domain, start_url)?;
        Ok(self.run_spider(&mut state).await)
    }

    fn kind(&self) -> &'static str {
        SPIDER_ADAPTER
    }
}
