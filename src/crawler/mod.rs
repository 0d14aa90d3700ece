//! Crawl orchestration
//!
//! This module wires extraction strategies to the crawl engine and runs
//! them, including:
//! - The domain-keyed crawler registry
//! - The adapter factory validating strategy bindings
//! - The spider adapter driving one strategy
//! - The coordinator running all configured sites on a bounded pool

mod adapter;
mod coordinator;
mod factory;
mod registry;

pub use adapter::{Crawler, SpiderAdapter, SPIDER_ADAPTER};
pub use coordinator::{pool_size, Coordinator, DEFAULT_SHUTDOWN_TIMEOUT};
pub use factory::{AdapterBuilder, AdapterFactory, SpiderAdapterBuilder};
pub use registry::{build_registry, CrawlerRegistry};

use crate::config::Config;
use crate::engine::PageFetcher;
use crate::strategy;
use crate::url::{extract_domain, normalize_domain};
use crate::Result;
use std::sync::Arc;
use url::Url;

/// Builds a ready coordinator for `config`
///
/// Validates every strategy binding, registers one crawler per known
/// strategy, and sizes the worker pool from the configuration. Binding
/// errors are returned here, before any site is crawled.
pub fn bootstrap(config: &Config, fetcher: Arc<dyn PageFetcher>) -> Result<Coordinator> {
    let strategies = strategy::catalog()?;
    let factory =
        AdapterFactory::with_spider(&strategies, fetcher, config.crawler.threads as usize)?;
    let registry = build_registry(strategies, &factory)?;

    tracing::info!(
        "Registered crawlers for {} domains: {}",
        registry.len(),
        registry.domains().join(", ")
    );

    for site in &config.sites {
        if registry.lookup(&site.domain).is_none() {
            tracing::warn!("No crawler for configured site {} ({})", site.name, site.domain);
        }

        let domain = normalize_domain(&site.domain);
        let host = Url::parse(&site.start_url)
            .ok()
            .as_ref()
            .and_then(extract_domain);
        if let Some(host) = host {
            if host != domain && !host.ends_with(&format!(".{}", domain)) {
                tracing::warn!(
                    "Start URL {} of {} is outside {}",
                    site.start_url,
                    site.name,
                    domain
                );
            }
        }
    }

    Ok(Coordinator::from_config(config, Arc::new(registry)))
}
