//! Periodic crawl trigger
//!
//! Runs the coordinator on a fixed interval and persists each run's entries.
//! A run always finishes before the next one starts; ticks missed while a
//! run is in progress are skipped.

use crate::crawler::Coordinator;
use crate::storage::{persist_entries, DigestStore, PersistSummary, RunStatus};
use crate::Result;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Outcome of one crawl pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub run_id: i64,
    pub status: RunStatus,
    pub entries_found: u64,
    pub persisted: PersistSummary,
}

/// Crawls all sites once and stores the results
///
/// The run is recorded as interrupted when `cancel` fired during the crawl.
/// Entries collected before the interruption are still stored.
pub async fn run_once(
    coordinator: &Coordinator,
    store: &mut dyn DigestStore,
    config_hash: &str,
    cancel: &CancellationToken,
) -> Result<RunReport> {
    let run_id = store.create_run(config_hash)?;
    tracing::info!("Starting run {}", run_id);

    let entries = match coordinator.start_all_crawlers_until(cancel).await {
        Ok(entries) => entries,
        Err(e) => {
            store.complete_run(run_id, RunStatus::Failed, 0, 0)?;
            return Err(e);
        }
    };

    let persisted = persist_entries(store, &entries);
    let status = if cancel.is_cancelled() {
        RunStatus::Interrupted
    } else {
        RunStatus::Completed
    };
    let entries_found = entries.len() as u64;

    store.complete_run(run_id, status, entries_found, persisted.saved)?;

    tracing::info!(
        "Run {} {}: {} found, {} saved, {} duplicates, {} invalid",
        run_id,
        status.to_db_string(),
        entries_found,
        persisted.saved,
        persisted.duplicates,
        persisted.invalid
    );

    Ok(RunReport {
        run_id,
        status,
        entries_found,
        persisted,
    })
}

/// Runs [`run_once`] every `interval` until `shutdown` fires
///
/// The first run starts immediately. A failed run is logged and the next
/// tick proceeds as usual. Returns the number of runs started.
pub async fn run_periodically(
    coordinator: &Coordinator,
    store: &mut dyn DigestStore,
    config_hash: &str,
    interval: Duration,
    shutdown: &CancellationToken,
) -> u64 {
    let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut runs = 0;

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        runs += 1;
        if let Err(e) = run_once(coordinator, store, config_hash, shutdown).await {
            tracing::error!("Crawl run failed: {}", e);
        }

        if shutdown.is_cancelled() {
            break;
        }
    }

    tracing::info!("Scheduler stopped after {} runs", runs);
    runs
}
