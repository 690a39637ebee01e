//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `Admission`: the seen-set and result counter deciding which listings get a detail request
//! - `CrawlRequest`: a unit of work in the frontier, tagged with its `RequestKind`
//! - `RequestOutcome`: how processing of a request ended

mod admission;
mod request;

// Re-export main types
pub use admission::Admission;
pub use request::{CrawlRequest, RequestKind, RequestOutcome};
