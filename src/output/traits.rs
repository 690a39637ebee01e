//! Output sink traits and error types
//!
//! This module defines the trait interface record sinks implement and
//! the data passed to them.

use crate::output::OutputRecord;
use crate::state::RequestKind;
use crate::storage::StorageError;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A request that exhausted its attempts
#[derive(Debug, Clone, PartialEq)]
pub struct FailedRequest {
    pub url: String,
    pub kind: RequestKind,
    pub attempts: u32,
    /// Display form of the last attempt's error
    pub error: String,
}

/// Trait for record sinks
///
/// A sink accepts one record at a time and appends it. Sinks do no
/// deduplication and are shared between crawl tasks, so implementations
/// must be thread-safe.
pub trait RecordSink: Send + Sync {
    /// Appends one emitted record
    ///
    /// # Arguments
    ///
    /// * `record` - The record to append
    fn emit(&self, record: &OutputRecord) -> OutputResult<()>;

    /// Records a request that exhausted its attempts
    ///
    /// Sinks that only carry records ignore failures.
    fn record_failure(&self, failure: &FailedRequest) -> OutputResult<()> {
        let _ = failure;
        Ok(())
    }

    /// Flushes anything buffered
    fn finalize(&self) -> OutputResult<()> {
        Ok(())
    }
}

impl<S: RecordSink + ?Sized> RecordSink for Arc<S> {
    fn emit(&self, record: &OutputRecord) -> OutputResult<()> {
        (**self).emit(record)
    }

    fn record_failure(&self, failure: &FailedRequest) -> OutputResult<()> {
        (**self).record_failure(failure)
    }

    fn finalize(&self) -> OutputResult<()> {
        (**self).finalize()
    }
}

/// Fans every call out to several sinks
///
/// All sinks are attempted; the first error is returned after the rest have run.
pub struct MultiSink {
    sinks: Vec<Box<dyn RecordSink>>,
}

impl MultiSink {
    pub fn new(sinks: Vec<Box<dyn RecordSink>>) -> Self {
        Self { sinks }
    }

    fn each<F>(&self, mut call: F) -> OutputResult<()>
    where
        F: FnMut(&dyn RecordSink) -> OutputResult<()>,
    {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = call(sink.as_ref()) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl RecordSink for MultiSink {
    fn emit(&self, record: &OutputRecord) -> OutputResult<()> {
        self.each(|sink| sink.emit(record))
    }

    fn record_failure(&self, failure: &FailedRequest) -> OutputResult<()> {
        self.each(|sink| sink.record_failure(failure))
    }

    fn finalize(&self) -> OutputResult<()> {
        self.each(|sink| sink.finalize())
    }
}
