//! Integration tests for the crawl pipeline
//!
//! These tests wire strategies, the adapter factory, the registry and the
//! coordinator together. Canned fetchers cover the news layout and wiremock
//! covers the HTTP fetcher end-to-end.

use async_trait::async_trait;
use mind_digest::config::{parse_config, SiteConfig};
use mind_digest::crawler::{bootstrap, build_registry, AdapterFactory, Coordinator, SPIDER_ADAPTER};
use mind_digest::engine::{EngineError, HttpFetcher, Page, PageFetcher, PageProcessor, SiteBehavior};
use mind_digest::entry::DigestEntry;
use mind_digest::scheduler::run_once;
use mind_digest::storage::{DigestStore, RunStatus, SqliteStore};
use mind_digest::strategy::{NewsArticleStrategy, NewsSelectors, NewsSiteProfile};
use mind_digest::{DigestError, ExtractionStrategy};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serves fixed HTML bodies keyed by URL
struct CannedFetcher {
    pages: HashMap<String, String>,
}

impl CannedFetcher {
    fn new(pages: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            pages: pages
                .iter()
                .map(|(url, body)| (url.to_string(), body.to_string()))
                .collect(),
        })
    }
}

#[async_trait]
impl PageFetcher for CannedFetcher {
    async fn fetch(&self, url: &str, _site: &SiteBehavior) -> Result<String, EngineError> {
        self.pages.get(url).cloned().ok_or(EngineError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

fn fast_site() -> SiteBehavior {
    SiteBehavior {
        retry_times: 0,
        sleep: Duration::ZERO,
        timeout: Duration::from_secs(5),
        ..SiteBehavior::default()
    }
}

fn example_profile() -> NewsSiteProfile {
    NewsSiteProfile {
        name: "example-news",
        domain: "example.com",
        adapter_kind: Some(SPIDER_ADAPTER),
        selectors: NewsSelectors {
            paywall: "div.paywall",
            title: "h1.title",
            paragraphs: "div.body p",
            author: "span.author",
            author_fallback: "span.byline",
        },
        site: fast_site(),
    }
}

fn example_pages() -> Arc<CannedFetcher> {
    CannedFetcher::new(&[
        (
            "https://www.example.com/news",
            r#"<html><body>
                <a href="/news/x/1">Article</a>
                <a href="/about">About</a>
            </body></html>"#,
        ),
        (
            "https://www.example.com/news/x/1",
            r#"<html><body>
                <h1 class="title">T</h1>
                <div class="body"><p>a</p><p>b</p></div>
            </body></html>"#,
        ),
    ])
}

fn example_site() -> SiteConfig {
    SiteConfig::new("Example", "example.com", "https://www.example.com/news")
}

fn example_coordinator(sites: Vec<SiteConfig>) -> Coordinator {
    let strategies: Vec<Box<dyn ExtractionStrategy>> =
        vec![Box::new(NewsArticleStrategy::new(example_profile()).unwrap())];
    let factory = AdapterFactory::with_spider(&strategies, example_pages(), 2).unwrap();
    let registry = build_registry(strategies, &factory).unwrap();

    Coordinator::new(Arc::new(registry), sites, 2).with_shutdown_timeout(Duration::from_secs(1))
}

#[tokio::test]
async fn test_example_site_yields_single_entry() {
    let coordinator = example_coordinator(vec![example_site()]);

    let entries = coordinator.start_all_crawlers().await.unwrap();

    assert_eq!(
        entries,
        vec![DigestEntry::new(
            "T",
            "a\nb",
            "",
            "https://www.example.com/news/x/1"
        )]
    );
}

#[tokio::test]
async fn test_unregistered_site_does_not_affect_others() {
    let coordinator = example_coordinator(vec![
        SiteConfig::new("Unknown", "unknown.org", "https://www.unknown.org/news"),
        SiteConfig::new("Example", " EXAMPLE.com ", "https://www.example.com/news"),
    ]);

    let entries = coordinator.start_all_crawlers().await.unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].source_url, "https://www.example.com/news/x/1");
}

#[tokio::test]
async fn test_repeated_runs_do_not_accumulate() {
    let coordinator = example_coordinator(vec![example_site()]);

    assert_eq!(coordinator.start_all_crawlers().await.unwrap().len(), 1);
    assert_eq!(coordinator.start_all_crawlers().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_shutdown_twice() {
    let coordinator = example_coordinator(vec![example_site()]);
    coordinator.start_all_crawlers().await.unwrap();

    coordinator.shutdown().await;
    coordinator.shutdown().await;

    assert!(matches!(
        coordinator.start_all_crawlers().await,
        Err(DigestError::ShutDown)
    ));
}

#[tokio::test]
async fn test_scheduled_run_persists_once() {
    let coordinator = example_coordinator(vec![example_site()]);
    let dir = tempfile::TempDir::new().unwrap();
    let mut store = SqliteStore::new(&dir.path().join("digest.db")).unwrap();
    let cancel = CancellationToken::new();

    let first = run_once(&coordinator, &mut store, "hash", &cancel).await.unwrap();
    let second = run_once(&coordinator, &mut store, "hash", &cancel).await.unwrap();

    assert_eq!(first.persisted.saved, 1);
    assert_eq!(second.persisted.saved, 0);
    assert_eq!(second.persisted.duplicates, 1);
    assert_eq!(second.status, RunStatus::Completed);
    assert_eq!(store.count().unwrap(), 1);
    assert_eq!(store.count_runs().unwrap(), 2);
}

/// Collects the `<title>` of every page under `/articles/`
struct TitleCollector {
    site: SiteBehavior,
    results: Vec<DigestEntry>,
}

impl PageProcessor for TitleCollector {
    fn process(&mut self, page: &mut Page) {
        if page.url().path().starts_with("/articles/") {
            let selector = mind_digest::engine::parse_selector("title").unwrap();
            match page.first_text(&selector) {
                Some(title) => self.results.push(DigestEntry::new(
                    title,
                    "body",
                    "",
                    page.url().as_str(),
                )),
                None => page.set_skip(true),
            }
            return;
        }

        let links = page.links();
        page.add_target_requests(links);
        page.set_skip(true);
    }

    fn site(&self) -> &SiteBehavior {
        &self.site
    }
}

impl ExtractionStrategy for TitleCollector {
    fn name(&self) -> &'static str {
        "title-collector"
    }

    fn domain(&self) -> &str {
        "127.0.0.1"
    }

    fn adapter_kind(&self) -> Option<&'static str> {
        Some(SPIDER_ADAPTER)
    }

    fn init(&mut self, _domain: &str, _start_url: &str) -> mind_digest::Result<()> {
        self.results.clear();
        Ok(())
    }

    fn results(&self) -> Vec<DigestEntry> {
        self.results.clone()
    }
}

#[tokio::test]
async fn test_http_crawl_against_mock_server() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            format!(
                r#"<html><body>
                    <a href="{base}/articles/one">One</a>
                    <a href="/articles/two">Two</a>
                    <a href="/articles/broken">Broken</a>
                    <a href="/files/report.pdf">Report</a>
                </body></html>"#
            ),
            "text/html",
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/articles/one"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><head><title>One</title></head></html>", "text/html"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/articles/two"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><head><title>Two</title></head></html>", "text/html"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/articles/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF", "application/pdf"))
        .mount(&server)
        .await;

    let config = parse_config(
        r#"
[crawler]
threads = 2

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0"
contact-url = "https://example.com/about"

[output]
database-path = "./unused.db"

[[sites]]
name = "Example"
domain = "example.com"
start-url = "https://www.example.com/news"
"#,
    )
    .unwrap();

    let fetcher = Arc::new(HttpFetcher::from_config(&config.user_agent).unwrap());
    let strategies: Vec<Box<dyn ExtractionStrategy>> = vec![Box::new(TitleCollector {
        site: fast_site(),
        results: Vec::new(),
    })];
    let factory = AdapterFactory::with_spider(&strategies, fetcher, 2).unwrap();
    let registry = build_registry(strategies, &factory).unwrap();

    let coordinator = Coordinator::new(
        Arc::new(registry),
        vec![SiteConfig::new("Mock", "127.0.0.1", format!("{}/", base))],
        2,
    );

    let entries = coordinator.start_all_crawlers().await.unwrap();
    let mut titles: Vec<_> = entries.iter().map(|e| e.title.as_str()).collect();
    titles.sort();

    assert_eq!(titles, vec!["One", "Two"]);
    coordinator.shutdown().await;
}

#[tokio::test]
async fn test_bootstrap_registers_catalog() {
    let config = parse_config(
        r#"
[crawler]
threads = 1

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0"
contact-url = "https://example.com/about"

[output]
database-path = "./unused.db"

[[sites]]
name = "Spektrum"
domain = "spektrum.de"
start-url = "https://www.spektrum.de/news/"

[[sites]]
name = "Scinexx"
domain = "scinexx.de"
start-url = "https://www.scinexx.de/news/"

[[sites]]
name = "Unknown"
domain = "unknown.org"
start-url = "https://www.unknown.org/"
"#,
    )
    .unwrap();

    let coordinator = bootstrap(&config, CannedFetcher::new(&[])).unwrap();

    assert_eq!(coordinator.pool_size(), 3);
    assert_eq!(coordinator.sites().len(), 3);

    coordinator.shutdown().await;
}

#[tokio::test]
async fn test_unbound_strategy_fails_before_crawling() {
    struct Unbound(SiteBehavior);

    impl PageProcessor for Unbound {
        fn process(&mut self, _page: &mut Page) {}

        fn site(&self) -> &SiteBehavior {
            &self.0
        }
    }

    impl ExtractionStrategy for Unbound {
        fn name(&self) -> &'static str {
            "unbound"
        }

        fn domain(&self) -> &str {
            "example.com"
        }

        fn init(&mut self, _domain: &str, _start_url: &str) -> mind_digest::Result<()> {
            Ok(())
        }

        fn results(&self) -> Vec<DigestEntry> {
            Vec::new()
        }
    }

    let strategies: Vec<Box<dyn ExtractionStrategy>> = vec![
        Box::new(NewsArticleStrategy::new(example_profile()).unwrap()),
        Box::new(Unbound(fast_site())),
    ];

    let result = AdapterFactory::with_spider(&strategies, example_pages(), 1);
    assert!(matches!(result, Err(DigestError::Configuration(_))));
}
