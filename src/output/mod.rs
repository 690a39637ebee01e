//! Output module: the result emitter and the sinks it writes to
//!
//! This module handles:
//! - Assembling `OutputRecord`s from listing extraction results
//! - Forwarding records and failed requests to sinks (SQLite, JSON Lines)
//! - Reporting statistics from the record database

mod jsonl_sink;
mod record;
mod sqlite_sink;
pub mod stats;
mod traits;

pub use jsonl_sink::JsonLinesSink;
pub use record::{assemble_record, Emitter, OutputRecord};
pub use sqlite_sink::SqliteSink;
pub use stats::{load_statistics, print_statistics, CrawlStatistics};
pub use traits::{FailedRequest, MultiSink, OutputError, OutputResult, RecordSink};
