//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the DigestStore trait.

use crate::entry::DigestEntry;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{DigestStore, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus, StoredEntry};
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;

const ENTRY_COLUMNS: &str = "id, title, summary, author, source_url, created_at, updated_at";
const RUN_COLUMNS: &str =
    "id, started_at, finished_at, config_hash, status, entries_found, entries_saved";

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates the database at `path`
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<StoredEntry> {
    Ok(StoredEntry {
        id: row.get(0)?,
        entry: DigestEntry {
            title: row.get(1)?,
            summary: row.get(2)?,
            author: row.get(3)?,
            source_url: row.get(4)?,
        },
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?).unwrap_or(RunStatus::Failed),
        entries_found: row.get::<_, i64>(5)?.max(0) as u64,
        entries_saved: row.get::<_, i64>(6)?.max(0) as u64,
    })
}

/// Maps unique-constraint failures on `source_url` to `Duplicate`
fn map_write_error(error: rusqlite::Error, source_url: &str) -> StorageError {
    match &error {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            StorageError::Duplicate {
                source_url: source_url.to_string(),
            }
        }
        _ => StorageError::Sqlite(error),
    }
}

impl DigestStore for SqliteStore {
    // ===== Entries =====

    fn save(&mut self, entry: &DigestEntry) -> StorageResult<i64> {
        entry.validate()?;

        if self.get_by_source_url(&entry.source_url)?.is_some() {
            return Err(StorageError::Duplicate {
                source_url: entry.source_url.clone(),
            });
        }

        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO digest_entries (title, summary, author, source_url, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                params![entry.title, entry.summary, entry.author, entry.source_url, now],
            )
            .map_err(|e| map_write_error(e, &entry.source_url))?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_by_id(&self, id: i64) -> StorageResult<Option<StoredEntry>> {
        let entry = self
            .conn
            .query_row(
                &format!("SELECT {} FROM digest_entries WHERE id = ?1", ENTRY_COLUMNS),
                params![id],
                entry_from_row,
            )
            .optional()?;
        Ok(entry)
    }

    fn get_by_source_url(&self, source_url: &str) -> StorageResult<Option<StoredEntry>> {
        let entry = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM digest_entries WHERE source_url = ?1",
                    ENTRY_COLUMNS
                ),
                params![source_url],
                entry_from_row,
            )
            .optional()?;
        Ok(entry)
    }

    fn list_all(&self) -> StorageResult<Vec<StoredEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM digest_entries ORDER BY id",
            ENTRY_COLUMNS
        ))?;

        let entries = stmt
            .query_map([], entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    fn update(&mut self, id: i64, entry: &DigestEntry) -> StorageResult<()> {
        entry.validate()?;

        let now = Utc::now().to_rfc3339();
        let changed = self
            .conn
            .execute(
                "UPDATE digest_entries
                 SET title = ?1, summary = ?2, author = ?3, source_url = ?4, updated_at = ?5
                 WHERE id = ?6",
                params![entry.title, entry.summary, entry.author, entry.source_url, now, id],
            )
            .map_err(|e| map_write_error(e, &entry.source_url))?;

        if changed == 0 {
            return Err(StorageError::EntryNotFound(id));
        }
        Ok(())
    }

    fn delete(&mut self, id: i64) -> StorageResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM digest_entries WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM digest_entries", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Runs =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO crawl_runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn complete_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        entries_found: u64,
        entries_saved: u64,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE crawl_runs
             SET status = ?1, finished_at = ?2, entries_found = ?3, entries_saved = ?4
             WHERE id = ?5",
            params![
                status.to_db_string(),
                now,
                entries_found as i64,
                entries_saved as i64,
                run_id
            ],
        )?;

        if changed == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM crawl_runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM crawl_runs ORDER BY id DESC LIMIT 1",
                    RUN_COLUMNS
                ),
                [],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }

    fn count_runs(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM crawl_runs", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
