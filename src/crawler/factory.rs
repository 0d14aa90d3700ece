//! Adapter factory
//!
//! Resolves each extraction strategy to the adapter kind it declares and
//! builds the matching crawler. Bindings are checked once, when the factory
//! is constructed, so a strategy without a usable binding stops startup
//! instead of failing on its first crawl.

use crate::crawler::{Crawler, SpiderAdapter, SPIDER_ADAPTER};
use crate::engine::PageFetcher;
use crate::strategy::ExtractionStrategy;
use crate::{DigestError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Builds crawlers of one adapter kind
pub trait AdapterBuilder: Send + Sync {
    /// Adapter kind strategies refer to
    fn kind(&self) -> &'static str;

    /// Binds `strategy` to a new crawler using `threads` engine workers
    fn build(&self, strategy: Box<dyn ExtractionStrategy>, threads: usize)
        -> Result<Arc<dyn Crawler>>;
}

/// Builder for [`SpiderAdapter`] crawlers sharing one page fetcher
pub struct SpiderAdapterBuilder {
    fetcher: Arc<dyn PageFetcher>,
}

impl SpiderAdapterBuilder {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }
}

impl AdapterBuilder for SpiderAdapterBuilder {
    fn kind(&self) -> &'static str {
        SPIDER_ADAPTER
    }

    fn build(
        &self,
        strategy: Box<dyn ExtractionStrategy>,
        threads: usize,
    ) -> Result<Arc<dyn Crawler>> {
        if threads == 0 {
            return Err(DigestError::InvalidArgument(format!(
                "thread count for {} must be positive",
                strategy.name()
            )));
        }

        Ok(Arc::new(SpiderAdapter::new(
            strategy,
            Arc::clone(&self.fetcher),
            threads,
        )))
    }
}

/// Creates crawlers for extraction strategies
pub struct AdapterFactory {
    /// Strategy name to adapter kind
    bindings: HashMap<&'static str, &'static str>,
    builders: HashMap<&'static str, Box<dyn AdapterBuilder>>,
    threads: usize,
}

impl AdapterFactory {
    /// Validates the bindings of every strategy in `strategies`
    ///
    /// Fails with [`DigestError::Configuration`] if a strategy declares no
    /// adapter kind, names a kind no builder provides, or shares its name
    /// with a strategy bound to a different kind.
    pub fn new(
        strategies: &[Box<dyn ExtractionStrategy>],
        builders: Vec<Box<dyn AdapterBuilder>>,
        threads: usize,
    ) -> Result<Self> {
        let mut by_kind: HashMap<&'static str, Box<dyn AdapterBuilder>> = HashMap::new();
        for builder in builders {
            let kind = builder.kind();
            if by_kind.insert(kind, builder).is_some() {
                return Err(DigestError::Configuration(format!(
                    "more than one builder for adapter kind '{}'",
                    kind
                )));
            }
        }

        let mut bindings = HashMap::new();
        for strategy in strategies {
            let name = strategy.name();
            let kind = strategy.adapter_kind().ok_or_else(|| {
                DigestError::Configuration(format!(
                    "strategy '{}' declares no adapter kind",
                    name
                ))
            })?;

            if !by_kind.contains_key(kind) {
                return Err(DigestError::Configuration(format!(
                    "strategy '{}' is bound to unknown adapter kind '{}'",
                    name, kind
                )));
            }

            if let Some(previous) = bindings.insert(name, kind) {
                if previous != kind {
                    return Err(DigestError::Configuration(format!(
                        "strategy '{}' is bound to both '{}' and '{}'",
                        name, previous, kind
                    )));
                }
            }

            tracing::debug!("Bound strategy {} to adapter {}", name, kind);
        }

        Ok(Self {
            bindings,
            builders: by_kind,
            threads,
        })
    }

    /// Convenience constructor with the spider builder only
    pub fn with_spider(
        strategies: &[Box<dyn ExtractionStrategy>],
        fetcher: Arc<dyn PageFetcher>,
        threads: usize,
    ) -> Result<Self> {
        Self::new(
            strategies,
            vec![Box::new(SpiderAdapterBuilder::new(fetcher))],
            threads,
        )
    }

    /// Builds the crawler bound to `strategy`'s type
    pub fn create_adapter(&self, strategy: Box<dyn ExtractionStrategy>) -> Result<Arc<dyn Crawler>> {
        let name = strategy.name();
        let kind = self.bindings.get(name).ok_or_else(|| {
            DigestError::Configuration(format!("strategy '{}' was not registered", name))
        })?;

        let builder = self.builders.get(kind).ok_or_else(|| {
            DigestError::Configuration(format!("no builder for adapter kind '{}'", kind))
        })?;

        builder.build(strategy, self.threads)
    }

    pub fn threads(&self) -> usize {
        self.threads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineError, Page, PageProcessor, SiteBehavior};
    use crate::entry::DigestEntry;
    use async_trait::async_trait;

    struct NoFetcher;

    #[async_trait]
    impl PageFetcher for NoFetcher {
        async fn fetch(&self, url: &str, _site: &SiteBehavior) -> std::result::Result<String, EngineError> {
            Err(EngineError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    struct Stub {
        name: &'static str,
        kind: Option<&'static str>,
        site: SiteBehavior,
    }

    impl PageProcessor for Stub {
        fn process(&mut self, _page: &mut Page) {}

        fn site(&self) -> &SiteBehavior {
            &self.site
        }
    }

    impl ExtractionStrategy for Stub {
        fn name(&self) -> &'static str {
            self.name
        }

        fn domain(&self) -> &str {
            "example.com"
        }

        fn adapter_kind(&self) -> Option<&'static str> {
            self.kind
        }

        fn init(&mut self, _domain: &str, _start_url: &str) -> Result<()> {
            Ok(())
        }

        fn results(&self) -> Vec<DigestEntry> {
            Vec::new()
        }
    }

    fn stub(name: &'static str, kind: Option<&'static str>) -> Box<dyn ExtractionStrategy> {
        Box::new(Stub {
            name,
            kind,
            site: SiteBehavior::default(),
        })
    }

    fn fetcher() -> Arc<dyn PageFetcher> {
        Arc::new(NoFetcher)
    }

    #[test]
    fn test_create_adapter_for_bound_strategy() {
        let strategies = vec![stub("a", Some(SPIDER_ADAPTER))];
        let factory = AdapterFactory::with_spider(&strategies, fetcher(), 3).unwrap();

        let crawler = factory.create_adapter(stub("a", Some(SPIDER_ADAPTER))).unwrap();
        assert_eq!(crawler.kind(), SPIDER_ADAPTER);
        assert_eq!(factory.threads(), 3);
    }

    #[test]
    fn test_missing_binding_fails_at_construction() {
        let strategies = vec![stub("a", Some(SPIDER_ADAPTER)), stub("b", None)];
        let result = AdapterFactory::with_spider(&strategies, fetcher(), 1);
        assert!(matches!(result, Err(DigestError::Configuration(_))));
    }

    #[test]
    fn test_unknown_kind_fails_at_construction() {
        let strategies = vec![stub("a", Some("headless-browser"))];
        let result = AdapterFactory::with_spider(&strategies, fetcher(), 1);
        assert!(matches!(result, Err(DigestError::Configuration(_))));
    }

    #[test]
    fn test_conflicting_bindings_fail() {
        let builders: Vec<Box<dyn AdapterBuilder>> = vec![Box::new(SpiderAdapterBuilder::new(fetcher()))];
        let strategies = vec![stub("a", Some(SPIDER_ADAPTER)), stub("a", Some("other"))];
        assert!(AdapterFactory::new(&strategies, builders, 1).is_err());
    }

    #[test]
    fn test_duplicate_builders_fail() {
        let builders: Vec<Box<dyn AdapterBuilder>> = vec![
            Box::new(SpiderAdapterBuilder::new(fetcher())),
            Box::new(SpiderAdapterBuilder::new(fetcher())),
        ];
        assert!(AdapterFactory::new(&[], builders, 1).is_err());
    }

    #[test]
    fn test_unregistered_strategy_is_configuration_error() {
        let strategies = vec![stub("a", Some(SPIDER_ADAPTER))];
        let factory = AdapterFactory::with_spider(&strategies, fetcher(), 1).unwrap();

        let result = factory.create_adapter(stub("unknown", Some(SPIDER_ADAPTER)));
        assert!(matches!(result, Err(DigestError::Configuration(_))));
    }

    #[test]
    fn test_builder_rejects_zero_threads() {
        let builder = SpiderAdapterBuilder::new(fetcher());
        let result = builder.build(stub("a", Some(SPIDER_ADAPTER)), 0);
        assert!(matches!(result, Err(DigestError::InvalidArgument(_))));
    }

    #[test]
    fn test_zero_threads_surface_on_create() {
        let strategies = vec![stub("a", Some(SPIDER_ADAPTER))];
        let factory = AdapterFactory::with_spider(&strategies, fetcher(), 0).unwrap();
        let result = factory.create_adapter(stub("a", Some(SPIDER_ADAPTER)));
        assert!(matches!(result, Err(DigestError::InvalidArgument(_))));
    }
}
