//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::output::{FailedRequest, OutputRecord};
use crate::storage::{FailedRequestRecord, RunCounts, RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Business rows are append-only: a record is never updated once written.
pub trait Storage: Send {
    // ===== Run Management =====

    /// Creates a new crawl run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    /// * `search_query` - The search term the run starts from
    /// * `location` - The location the run searches in
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(
        &mut self,
        config_hash: &str,
        search_query: &str,
        location: &str,
    ) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Marks a run as finished with the given status and final counters
    fn finish_run(&mut self, run_id: i64, status: RunStatus, counts: &RunCounts)
        -> StorageResult<()>;

    // ===== Records =====

    /// Appends an emitted business record
    ///
    /// # Returns
    ///
    /// The row ID of the new record
    fn insert_business(&mut self, run_id: i64, record: &OutputRecord) -> StorageResult<i64>;

    /// Records a request that exhausted its attempts
    fn record_failed_request(&mut self, run_id: i64, failure: &FailedRequest)
        -> StorageResult<()>;

    /// Gets the failed requests of a run, oldest first
    fn get_failed_requests(&self, run_id: i64) -> StorageResult<Vec<FailedRequestRecord>>;

    /// Loads the distinct listing URLs of every stored business
    ///
    /// Used to carry the seen-set over from earlier runs.
    fn load_business_urls(&self) -> StorageResult<Vec<String>>;

    // ===== Statistics =====

    /// Counts stored business records across all runs
    fn count_businesses(&self) -> StorageResult<u64>;

    /// Counts distinct listing URLs across all runs
    fn count_unique_businesses(&self) -> StorageResult<u64>;

    /// Average rating of the stored records that have one
    fn average_rating(&self) -> StorageResult<Option<f64>>;

    /// Most frequent categories with their record counts, most frequent first
    fn top_categories(&self, limit: usize) -> StorageResult<Vec<(String, u64)>>;
}
