//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::output::{FailedRequest, OutputRecord};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{FailedRequestRecord, RunCounts, RunRecord, RunStatus};
use crate::RippleError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use std::path::Path;

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, search_query, location, status,
     businesses_enqueued, unique_seen, records_emitted, failed_requests";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(RippleError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, RippleError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, RippleError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        search_query: row.get(4)?,
        location: row.get(5)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(6)?)
            .unwrap_or(RunStatus::Running),
        counts: RunCounts {
            businesses_enqueued: row.get(7)?,
            unique_seen: row.get::<_, i64>(8)? as u64,
            records_emitted: row.get::<_, i64>(9)? as u64,
            failed_requests: row.get::<_, i64>(10)? as u64,
        },
    })
}

/// Serializes an optional collection to a JSON column value
fn json_column<T: Serialize>(value: Option<&T>) -> StorageResult<Option<String>> {
    value
        .map(serde_json::to_string)
        .transpose()
        .map_err(StorageError::from)
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(
        &mut self,
        config_hash: &str,
        search_query: &str,
        location: &str,
    ) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, search_query, location, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                now,
                config_hash,
                search_query,
                location,
                RunStatus::Running.to_db_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        counts: &RunCounts,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, businesses_enqueued = ?3,
             unique_seen = ?4, records_emitted = ?5, failed_requests = ?6 WHERE id = ?7",
            params![
                status.to_db_string(),
                now,
                counts.businesses_enqueued,
                counts.unique_seen as i64,
                counts.records_emitted as i64,
                counts.failed_requests as i64,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Records =====

    fn insert_business(&mut self, run_id: i64, record: &OutputRecord) -> StorageResult<i64> {
        let detail = &record.detail;
        let photos = serde_json::to_string(&detail.photos)?;

        self.conn.execute(
            "INSERT INTO businesses (run_id, url, business_name, rating, review_count, categories,
             price_range, address, phone, hours, photos, reviews, scraped_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                run_id,
                detail.url,
                detail.business_name,
                detail.rating,
                detail.review_count,
                json_column(detail.categories.as_ref())?,
                detail.price_range,
                detail.address,
                detail.phone,
                json_column(detail.hours.as_ref())?,
                photos,
                json_column(record.reviews.as_ref())?,
                record.scraped_at.to_rfc3339(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn record_failed_request(
        &mut self,
        run_id: i64,
        failure: &FailedRequest,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO failed_requests (run_id, url, kind, attempts, error_message, failed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                run_id,
                failure.url,
                failure.kind.to_db_string(),
                failure.attempts,
                failure.error,
                now
            ],
        )?;
        Ok(())
    }

    fn get_failed_requests(&self, run_id: i64) -> StorageResult<Vec<FailedRequestRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, url, kind, attempts, error_message, failed_at
             FROM failed_requests WHERE run_id = ?1 ORDER BY id",
        )?;

        let records = stmt
            .query_map(params![run_id], |row| {
                Ok(FailedRequestRecord {
                    id: row.get(0)?,
                    run_id: row.get(1)?,
                    url: row.get(2)?,
                    kind: row.get(3)?,
                    attempts: row.get(4)?,
                    error_message: row.get(5)?,
                    failed_at: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn load_business_urls(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT DISTINCT url FROM businesses")?;
        let urls = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(urls)
    }

    // ===== Statistics =====

    fn count_businesses(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM businesses", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_unique_businesses(&self) -> StorageResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(DISTINCT url) FROM businesses", [], |row| {
                    row.get(0)
                })?;
        Ok(count as u64)
    }

    fn average_rating(&self) -> StorageResult<Option<f64>> {
        let average: Option<f64> = self.conn.query_row(
            "SELECT AVG(rating) FROM businesses WHERE rating IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(average)
    }

    fn top_categories(&self, limit: usize) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT category.value, COUNT(*) AS n
             FROM businesses, json_each(businesses.categories) AS category
             WHERE businesses.categories IS NOT NULL
             GROUP BY category.value
             ORDER BY n DESC, category.value ASC
             LIMIT ?1",
        )?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}
