//! Storage module for persisting digest entries
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Entry persistence with duplicate rejection by source URL
//! - Crawl run bookkeeping

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{DigestStore, StorageError, StorageResult};

use crate::entry::DigestEntry;

/// A persisted entry with its database metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub id: i64,
    pub entry: DigestEntry,
    pub created_at: String,
    pub updated_at: String,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub entries_found: u64,
    pub entries_saved: u64,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Outcome counters of [`persist_entries`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistSummary {
    pub saved: u64,
    pub duplicates: u64,
    pub invalid: u64,
    pub failed: u64,
}

impl PersistSummary {
    pub fn total(&self) -> u64 {
        self.saved + self.duplicates + self.invalid + self.failed
    }
}

/// Saves every entry, counting outcomes instead of stopping on errors
pub fn persist_entries(store: &mut dyn DigestStore, entries: &[DigestEntry]) -> PersistSummary {
    let mut summary = PersistSummary::default();

    for entry in entries {
        match store.save(entry) {
            Ok(_) => summary.saved += 1,
            Err(StorageError::Duplicate { source_url }) => {
                tracing::debug!("Already stored: {}", source_url);
                summary.duplicates += 1;
            }
            Err(StorageError::Invalid(e)) => {
                tracing::warn!("Rejected entry from {}: {}", entry.source_url, e);
                summary.invalid += 1;
            }
            Err(e) => {
                tracing::error!("Failed to store entry from {}: {}", entry.source_url, e);
                summary.failed += 1;
            }
        }
    }

    summary
}
