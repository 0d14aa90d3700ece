//! Crawl coordinator - runs every configured site and aggregates results
//!
//! Each configured site becomes one task on a bounded worker pool. Tasks
//! resolve their crawler through the registry, run it, and hand back the
//! extracted entries. A failing site is logged and contributes nothing; it
//! never affects the other sites of the same run.

use crate::config::{Config, SiteConfig};
use crate::crawler::CrawlerRegistry;
use crate::entry::DigestEntry;
use crate::{DigestError, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Default grace period for each shutdown stage
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Number of concurrent site tasks for `threads` and `site_count`
///
/// Every configured site gets its own slot, with a floor of two.
pub fn pool_size(threads: usize, site_count: usize) -> usize {
    threads.max(site_count.max(2))
}

/// Fixed-size pool of site tasks owned by one coordinator
struct WorkerPool {
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
    in_flight: Mutex<Vec<AbortHandle>>,
    closed: AtomicBool,
}

impl WorkerPool {
    fn new(size: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(size)),
            tracker: TaskTracker::new(),
            in_flight: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Spawns `task` once a pool slot is free
    fn submit<F>(&self, task: F) -> tokio::task::JoinHandle<Result<Vec<DigestEntry>>>
    where
        F: std::future::Future<Output = Result<Vec<DigestEntry>>> + Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        let handle = self.tracker.spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|_| DigestError::ShutDown)?;
            task.await
        });

        if let Ok(mut in_flight) = self.in_flight.lock() {
            in_flight.retain(|h| !h.is_finished());
            in_flight.push(handle.abort_handle());
        }

        handle
    }

    fn abort_all(&self) -> usize {
        match self.in_flight.lock() {
            Ok(mut in_flight) => {
                let pending = in_flight.iter().filter(|h| !h.is_finished()).count();
                for handle in in_flight.drain(..) {
                    handle.abort();
                }
                pending
            }
            Err(_) => 0,
        }
    }
}

/// Runs all configured sites concurrently and collects their entries
pub struct Coordinator {
    registry: Arc<CrawlerRegistry>,
    sites: Vec<SiteConfig>,
    pool: WorkerPool,
    pool_size: usize,
    shutdown_timeout: Duration,
}

impl Coordinator {
    /// Creates a coordinator for `sites` with a pool sized from `threads`
    pub fn new(registry: Arc<CrawlerRegistry>, sites: Vec<SiteConfig>, threads: usize) -> Self {
        let size = pool_size(threads, sites.len());
        tracing::debug!("Coordinator pool size {} for {} sites", size, sites.len());

        Self {
            registry,
            sites,
            pool: WorkerPool::new(size),
            pool_size: size,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Creates a coordinator from the loaded configuration
    pub fn from_config(config: &Config, registry: Arc<CrawlerRegistry>) -> Self {
        Self::new(registry, config.sites.clone(), config.crawler.threads as usize)
            .with_shutdown_timeout(config.crawler.shutdown_timeout())
    }

    /// Overrides the grace period of each shutdown stage
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn sites(&self) -> &[SiteConfig] {
        &self.sites
    }

    /// Crawls every configured site and returns the union of their entries
    ///
    /// Waits for all sites. Order across sites is unspecified.
    pub async fn start_all_crawlers(&self) -> Result<Vec<DigestEntry>> {
        self.start_all_crawlers_until(&CancellationToken::new()).await
    }

    /// Like [`start_all_crawlers`](Self::start_all_crawlers), but stops
    /// waiting once `cancel` fires
    ///
    /// On cancellation, entries from sites that already finished are
    /// returned and the remaining site tasks are aborted. The token stays
    /// cancelled so the caller can observe the interruption.
    pub async fn start_all_crawlers_until(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<DigestEntry>> {
        if self.pool.is_closed() {
            return Err(DigestError::ShutDown);
        }

        tracing::info!("Starting crawl of {} sites", self.sites.len());

        let mut abort_handles = Vec::with_capacity(self.sites.len());
        let mut pending = FuturesUnordered::new();

        for site in &self.sites {
            let registry = Arc::clone(&self.registry);
            let task_site = site.clone();
            let handle = self
                .pool
                .submit(async move { crawl_site(&registry, &task_site).await });

            abort_handles.push(handle.abort_handle());
            let domain = site.domain.clone();
            pending.push(async move { (domain, handle.await) });
        }

        let mut entries = Vec::new();
        let mut completed = 0;

        loop {
            tokio::select! {
                biased;

                next = pending.next() => match next {
                    Some((domain, Ok(Ok(site_entries)))) => {
                        tracing::info!("{}: {} entries", domain, site_entries.len());
                        completed += 1;
                        entries.extend(site_entries);
                    }
                    Some((domain, Ok(Err(e)))) => {
                        tracing::error!("Crawl of {} failed: {}", domain, e);
                        completed += 1;
                    }
                    Some((domain, Err(e))) => {
                        tracing::error!("Crawl task for {} did not complete: {}", domain, e);
                        completed += 1;
                    }
                    None => break,
                },

                _ = cancel.cancelled() => {
                    tracing::warn!(
                        "Crawl interrupted with {}/{} sites finished",
                        completed,
                        self.sites.len()
                    );
                    for handle in &abort_handles {
                        handle.abort();
                    }
                    break;
                }
            }
        }

        tracing::info!(
            "Crawl finished: {} entries from {} sites",
            entries.len(),
            completed
        );

        Ok(entries)
    }

    /// Stops the worker pool
    ///
    /// Waits for in-flight sites for the shutdown timeout, then aborts them
    /// and waits once more. A pool that still has not drained is logged and
    /// abandoned. Calling this more than once has no further effect.
    pub async fn shutdown(&self) {
        if self.pool.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!("Coordinator already shut down");
            return;
        }

        self.pool.tracker.close();

        if tokio::time::timeout(self.shutdown_timeout, self.pool.tracker.wait())
            .await
            .is_ok()
        {
            tracing::info!("Coordinator shut down");
            return;
        }

        let aborted = self.pool.abort_all();
        tracing::warn!(
            "Site tasks still running after {:?}, aborted {}",
            self.shutdown_timeout,
            aborted
        );

        if tokio::time::timeout(self.shutdown_timeout, self.pool.tracker.wait())
            .await
            .is_err()
        {
            tracing::error!("Worker pool did not terminate");
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.pool.is_closed()
    }
}

async fn crawl_site(registry: &CrawlerRegistry, site: &SiteConfig) -> Result<Vec<DigestEntry>> {
    let crawler = registry.lookup(&site.domain).ok_or_else(|| {
        DigestError::Configuration(format!("no crawler for domain {}", site.domain))
    })?;

    crawler.run(&site.domain, &site.start_url).await
}
