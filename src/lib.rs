//! Mind-Digest: periodic news digest crawler
//!
//! This crate crawls a fixed set of news sites, extracts article entries
//! (title, summary, author, source URL) with site-specific strategies, and
//! hands the aggregated entries to a persistence layer.

pub mod config;
pub mod crawler;
pub mod engine;
pub mod entry;
pub mod scheduler;
pub mod storage;
pub mod strategy;
pub mod url;

use thiserror::Error;

/// Main error type for Mind-Digest operations
#[derive(Debug, Error)]
pub enum DigestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Crawler configuration error: {0}")]
    Configuration(String),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Engine error: {0}")]
    Engine(#[from] engine::EngineError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Coordinator has been shut down")]
    ShutDown,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for Mind-Digest operations
pub type Result<T> = std::result::Result<T, DigestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{AdapterFactory, Coordinator, Crawler, CrawlerRegistry};
pub use entry::DigestEntry;
pub use strategy::ExtractionStrategy;
