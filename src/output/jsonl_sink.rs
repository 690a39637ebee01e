//! JSON Lines record sink
//!
//! Appends each record as one line of camelCase JSON.

use crate::output::traits::{OutputError, OutputResult, RecordSink};
use crate::output::OutputRecord;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

pub struct JsonLinesSink {
    writer: Mutex<BufWriter<File>>,
}

impl JsonLinesSink {
    /// Opens `path` for appending, creating it if needed
    pub fn open(path: &Path) -> OutputResult<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }
}

impl RecordSink for JsonLinesSink {
    fn emit(&self, record: &OutputRecord) -> OutputResult<()> {
        let line = serde_json::to_string(record)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| OutputError::Write(format!("Failed to lock writer: {}", e)))?;
        writeln!(writer, "{}", line)?;
        // Each record is flushed so an interrupted run keeps every emitted line
        writer.flush()?;
        Ok(())
    }

    fn finalize(&self) -> OutputResult<()> {
        self.writer
            .lock()
            .map_err(|e| OutputError::Write(format!("Failed to lock writer: {}", e)))?
            .flush()?;
        Ok(())
    }
}
