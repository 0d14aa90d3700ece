//! Site-specific extraction strategies
//!
//! An extraction strategy is the page callback for one website. It decides
//! whether a fetched page is a listing or an article, pulls the article
//! fields, and buffers the resulting [`DigestEntry`] values until the
//! adapter collects them.
//!
//! Every strategy declares the domain it serves and the adapter kind that
//! should drive it. Adding a site means adding a strategy to [`catalog`];
//! nothing in the crawler module needs to change.

mod news;
mod sites;

pub use news::{NewsArticleStrategy, NewsSelectors, NewsSiteProfile};
pub use sites::{scinexx_profile, spektrum_profile};

use crate::engine::PageProcessor;
use crate::entry::DigestEntry;
use crate::DigestError;

/// Extraction logic for one website
pub trait ExtractionStrategy: PageProcessor {
    /// Unique strategy name, used as the key for adapter bindings
    fn name(&self) -> &'static str;

    /// Domain this strategy is registered under
    fn domain(&self) -> &str;

    /// Adapter kind that should drive this strategy
    ///
    /// Strategies that do not declare a kind are rejected when the adapter
    /// factory is built.
    fn adapter_kind(&self) -> Option<&'static str> {
        None
    }

    /// Prepares a new crawl of `domain` starting at `start_url`
    ///
    /// Clears the result buffer so the strategy can be reused across runs.
    fn init(&mut self, domain: &str, start_url: &str) -> Result<(), DigestError>;

    /// Entries extracted since the last `init`, in page-visit order
    fn results(&self) -> Vec<DigestEntry>;
}

/// Builds every known extraction strategy
pub fn catalog() -> Result<Vec<Box<dyn ExtractionStrategy>>, DigestError> {
    Ok(vec![
        Box::new(NewsArticleStrategy::new(spektrum_profile())?),
        Box::new(NewsArticleStrategy::new(scinexx_profile())?),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_names_are_unique() {
        let strategies = catalog().unwrap();
        let names: HashSet<_> = strategies.iter().map(|s| s.name()).collect();
        assert_eq!(names.len(), strategies.len());
    }

    #[test]
    fn test_catalog_declares_bindings() {
        for strategy in catalog().unwrap() {
            assert!(
                strategy.adapter_kind().is_some(),
                "{} has no adapter binding",
                strategy.name()
            );
        }
    }

    #[test]
    fn test_catalog_domains() {
        let domains: Vec<_> = catalog()
            .unwrap()
            .iter()
            .map(|s| s.domain().to_string())
            .collect();
        assert!(domains.contains(&"spektrum.de".to_string()));
        assert!(domains.contains(&"scinexx.de".to_string()));
    }
}
