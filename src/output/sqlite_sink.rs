//! SQLite-backed record sink
//!
//! Records and failed requests are written to the storage backend under the
//! current run.

use crate::output::traits::{FailedRequest, OutputResult, RecordSink};
use crate::output::OutputRecord;
use crate::storage::{Storage, StorageError};
use std::sync::{Arc, Mutex, MutexGuard};

/// SQLite-based record sink
pub struct SqliteSink {
    storage: Arc<Mutex<dyn Storage>>,
    run_id: i64,
}

impl SqliteSink {
    /// Creates a new SQLite sink
    ///
    /// # Arguments
    ///
    /// * `storage` - The storage backend to use
    /// * `run_id` - The current run ID
    pub fn new(storage: Arc<Mutex<dyn Storage>>, run_id: i64) -> Self {
        Self { storage, run_id }
    }

    fn lock(&self) -> Result<MutexGuard<'_, dyn Storage + 'static>, StorageError> {
        self.storage.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

impl RecordSink for SqliteSink {
    fn emit(&self, record: &OutputRecord) -> OutputResult<()> {
        self.lock()?.insert_business(self.run_id, record)?;
        Ok(())
    }

    fn record_failure(&self, failure: &FailedRequest) -> OutputResult<()> {
        self.lock()?.record_failed_request(self.run_id, failure)?;
        Ok(())
    }
}
