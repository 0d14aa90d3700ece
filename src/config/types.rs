use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Mind-Digest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub sites: Vec<SiteConfig>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Worker count for the coordinator pool floor and for each site's fetch engine
    #[serde(default = "default_threads")]
    pub threads: u32,

    /// Seconds to wait for in-flight crawls at each shutdown stage
    #[serde(rename = "shutdown-timeout-secs", default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Seconds between scheduled crawl runs
    #[serde(rename = "interval-secs", default = "default_interval")]
    pub interval_secs: u64,
}

impl CrawlerConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            interval_secs: default_interval(),
        }
    }
}

fn default_threads() -> u32 {
    4
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_interval() -> u64 {
    3600
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the identity as `Name/Version (+ContactURL)`
    pub fn user_agent_string(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// A website to crawl on every run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SiteConfig {
    /// Human readable site name
    pub name: String,

    /// Domain used to look up the site's crawler (e.g., "spektrum.de")
    pub domain: String,

    /// URL the crawl starts from
    #[serde(rename = "start-url")]
    pub start_url: String,
}

impl SiteConfig {
    pub fn new(
        name: impl Into<String>,
        domain: impl Into<String>,
        start_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            start_url: start_url.into(),
        }
    }
}
