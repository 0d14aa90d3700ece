//! Selector profiles for the supported news sites

use crate::crawler::SPIDER_ADAPTER;
use crate::engine::SiteBehavior;
use crate::strategy::{NewsSelectors, NewsSiteProfile};

/// Spektrum der Wissenschaft news articles
pub fn spektrum_profile() -> NewsSiteProfile {
    NewsSiteProfile {
        name: "spektrum-news",
        domain: "spektrum.de",
        adapter_kind: Some(SPIDER_ADAPTER),
        selectors: NewsSelectors {
            paywall: "article.pw-premium",
            title: "span.content__title",
            paragraphs: "article.content.pw-free p",
            author: "div.content__author__info__name a.line",
            author_fallback: "div.content__copyright span",
        },
        site: SiteBehavior::default(),
    }
}

/// Scinexx science news articles
pub fn scinexx_profile() -> NewsSiteProfile {
    NewsSiteProfile {
        name: "scinexx-news",
        domain: "scinexx.de",
        adapter_kind: Some(SPIDER_ADAPTER),
        selectors: NewsSelectors {
            paywall: "div.premium-content",
            title: "h1.entry-title",
            paragraphs: "div.entry-content > p",
            author: "span.author-name a",
            author_fallback: "div.post-author",
        },
        site: SiteBehavior::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::parse_selector;

    #[test]
    fn test_profile_selectors_parse() {
        for profile in [spektrum_profile(), scinexx_profile()] {
            let s = &profile.selectors;
            for selector in [s.paywall, s.title, s.paragraphs, s.author, s.author_fallback] {
                assert!(
                    parse_selector(selector).is_ok(),
                    "{}: bad selector {}",
                    profile.name,
                    selector
                );
            }
        }
    }
}
