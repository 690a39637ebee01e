//! Storage module for persisting crawl data
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Run tracking with final counters
//! - Append-only business records and failed-request bookkeeping
//! - The listing URLs carried over between runs

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::RippleError;

use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(RippleError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, RippleError> {
    SqliteStorage::new(path)
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub search_query: String,
    pub location: String,
    pub status: RunStatus,
    pub counts: RunCounts,
}

/// Counters stored on a run when it finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounts {
    /// Detail requests admitted (never exceeds the result cap)
    pub businesses_enqueued: u32,
    /// Distinct listing URLs seen by the run, excluding ones carried over from earlier runs
    pub unique_seen: u64,
    pub records_emitted: u64,
    pub failed_requests: u64,
}

/// A stored failed request
#[derive(Debug, Clone)]
pub struct FailedRequestRecord {
    pub id: i64,
    pub run_id: i64,
    pub url: String,
    pub kind: String,
    pub attempts: u32,
    pub error_message: String,
    pub failed_at: String,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
