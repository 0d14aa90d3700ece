//! Storage traits and error types
//!
//! This module defines the trait interface for digest stores and the
//! associated error types.

use crate::entry::{DigestEntry, EntryError};
use crate::storage::{RunRecord, RunStatus, StoredEntry};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Entry already stored: {source_url}")]
    Duplicate { source_url: String },

    #[error("Invalid entry: {0}")]
    Invalid(#[from] EntryError),

    #[error("Entry not found: {0}")]
    EntryNotFound(i64),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence backend for digest entries and crawl runs
///
/// Entries are unique by source URL. Implementations reject a second entry
/// with the same source URL instead of overwriting the first.
pub trait DigestStore: Send {
    // ===== Entries =====

    /// Stores a new entry and returns its ID
    ///
    /// # Errors
    ///
    /// * `StorageError::Invalid` - the entry violates a field limit
    /// * `StorageError::Duplicate` - an entry with this source URL exists
    fn save(&mut self, entry: &DigestEntry) -> StorageResult<i64>;

    /// Gets an entry by ID
    fn get_by_id(&self, id: i64) -> StorageResult<Option<StoredEntry>>;

    /// Gets an entry by source URL
    fn get_by_source_url(&self, source_url: &str) -> StorageResult<Option<StoredEntry>>;

    /// Lists all entries, oldest first
    fn list_all(&self) -> StorageResult<Vec<StoredEntry>>;

    /// Replaces the fields of an existing entry
    fn update(&mut self, id: i64, entry: &DigestEntry) -> StorageResult<()>;

    /// Deletes an entry, returning whether it existed
    fn delete(&mut self, id: i64) -> StorageResult<bool>;

    /// Counts stored entries
    fn count(&self) -> StorageResult<u64>;

    // ===== Runs =====

    /// Records the start of a crawl run and returns its ID
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run as finished with its final status and counters
    fn complete_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        entries_found: u64,
        entries_saved: u64,
    ) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Counts recorded runs
    fn count_runs(&self) -> StorageResult<u64>;
}
