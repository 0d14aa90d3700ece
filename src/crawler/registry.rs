//! Domain-keyed crawler registry
//!
//! Maps a normalized domain to the crawler that handles it. The registry is
//! filled once at startup and read concurrently by coordinator tasks.

use crate::crawler::{AdapterFactory, Crawler};
use crate::strategy::ExtractionStrategy;
use crate::url::normalize_domain;
use crate::{DigestError, Result};
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe mapping from domain to crawler
///
/// Domains are trimmed and lowercased on both registration and lookup, so
/// `" Example.COM "` and `"example.com"` address the same entry.
#[derive(Default)]
pub struct CrawlerRegistry {
    crawlers: DashMap<String, Arc<dyn Crawler>>,
}

impl CrawlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `crawler` for `domain`, replacing any previous entry
    pub fn register(&self, domain: &str, crawler: Arc<dyn Crawler>) -> Result<()> {
        let key = normalize_domain(domain);
        if key.is_empty() {
            return Err(DigestError::InvalidArgument(
                "domain must not be blank".to_string(),
            ));
        }

        if self.crawlers.insert(key.clone(), crawler).is_some() {
            tracing::debug!("Replaced crawler for {}", key);
        } else {
            tracing::debug!("Registered crawler for {}", key);
        }
        Ok(())
    }

    /// Returns the crawler registered for `domain`, if any
    pub fn lookup(&self, domain: &str) -> Option<Arc<dyn Crawler>> {
        let key = normalize_domain(domain);
        if key.is_empty() {
            return None;
        }
        self.crawlers.get(&key).map(|entry| Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.crawlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crawlers.is_empty()
    }

    /// Registered domains in sorted order
    pub fn domains(&self) -> Vec<String> {
        let mut domains: Vec<String> = self.crawlers.iter().map(|e| e.key().clone()).collect();
        domains.sort();
        domains
    }
}

/// Builds a registry holding one crawler per strategy
///
/// Each strategy is registered under the domain it declares. A later
/// strategy declaring the same domain replaces the earlier one.
pub fn build_registry(
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    factory: &AdapterFactory,
) -> Result<CrawlerRegistry> {
    let registry = CrawlerRegistry::new();

    for strategy in strategies {
        let domain = strategy.domain().to_string();
        let name = strategy.name();
        let crawler = factory.create_adapter(strategy)?;
        registry.register(&domain, crawler)?;
        tracing::info!("Registered {} for {}", name, normalize_domain(&domain));
    }

    Ok(registry)
}
