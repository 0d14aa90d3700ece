//! Mind-Digest main entry point
//!
//! This is the command-line interface for the Mind-Digest news crawler.

use anyhow::Context;
use clap::Parser;
use mind_digest::config::{load_config_with_hash, Config};
use mind_digest::crawler::{bootstrap, pool_size};
use mind_digest::engine::HttpFetcher;
use mind_digest::scheduler::{run_once, run_periodically};
use mind_digest::storage::{DigestStore, SqliteStore};
use mind_digest::strategy::catalog;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Mind-Digest: a periodic news digest crawler
///
/// Mind-Digest crawls the configured news sites on a fixed interval,
/// extracts article entries with site-specific strategies, and stores new
/// entries in a SQLite database.
#[derive(Parser, Debug)]
#[command(name = "mind-digest")]
#[command(version)]
#[command(about = "A periodic news digest crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Run a single crawl pass and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    once: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with_all = ["once", "stats"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["once", "dry_run"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(config, &config_hash, cli.once).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("mind_digest=info,warn"),
            1 => EnvFilter::new("mind_digest=debug,info"),
            2 => EnvFilter::new("mind_digest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Mind-Digest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Threads: {}", config.crawler.threads);
    println!(
        "  Worker pool: {}",
        pool_size(config.crawler.threads as usize, config.sites.len())
    );
    println!("  Interval: {}s", config.crawler.interval_secs);
    println!("  Shutdown timeout: {}s", config.crawler.shutdown_timeout_secs);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.user_agent_string());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    let strategies = catalog()?;
    println!("\nExtraction Strategies ({}):", strategies.len());
    for strategy in &strategies {
        println!(
            "  - {} -> {} [{}]",
            strategy.name(),
            strategy.domain(),
            strategy.adapter_kind().unwrap_or("unbound")
        );
    }

    println!("\nSites ({}):", config.sites.len());
    for site in &config.sites {
        let handled = strategies
            .iter()
            .any(|s| s.domain().eq_ignore_ascii_case(site.domain.trim()));
        println!(
            "  - {} ({}) {}{}",
            site.name,
            site.domain,
            site.start_url,
            if handled { "" } else { "  [no crawler]" }
        );
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let store = SqliteStore::new(Path::new(&config.output.database_path))?;

    println!("Stored entries: {}", store.count()?);
    println!("Crawl runs: {}", store.count_runs()?);

    if let Some(run) = store.latest_run()? {
        println!("\nLatest run #{}:", run.id);
        println!("  Status: {}", run.status.to_db_string());
        println!("  Started: {}", run.started_at);
        if let Some(finished) = &run.finished_at {
            println!("  Finished: {}", finished);
        }
        println!("  Entries found: {}", run.entries_found);
        println!("  Entries saved: {}", run.entries_saved);
    }

    Ok(())
}

/// Handles the crawl modes: a single pass or the periodic schedule
async fn handle_crawl(config: Config, config_hash: &str, once: bool) -> anyhow::Result<()> {
    let fetcher = Arc::new(HttpFetcher::from_config(&config.user_agent)?);
    let coordinator = bootstrap(&config, fetcher)?;
    let mut store = SqliteStore::new(Path::new(&config.output.database_path))?;

    tracing::info!(
        "Crawling {} sites with a pool of {}",
        config.sites.len(),
        coordinator.pool_size()
    );

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping");
            signal.cancel();
        }
    });

    let result = if once {
        run_once(&coordinator, &mut store, config_hash, &shutdown)
            .await
            .map(|_| ())
    } else {
        run_periodically(
            &coordinator,
            &mut store,
            config_hash,
            config.crawler.interval(),
            &shutdown,
        )
        .await;
        Ok(())
    };

    coordinator.shutdown().await;
    result.context("crawl failed")
}
