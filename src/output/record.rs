//! Output records and the emitter that forwards them to a sink

use crate::extract::{BusinessDetail, Review, SearchCardSummary};
use crate::output::{FailedRequest, RecordSink};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// One emitted business: listing attributes, reviews and the scrape time
///
/// Serialized flat, so the listing fields sit next to `reviews` and `scrapedAt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRecord {
    #[serde(flatten)]
    pub detail: BusinessDetail,
    pub reviews: Option<Vec<Review>>,
    pub scraped_at: DateTime<Utc>,
}

impl OutputRecord {
    /// Builds a record stamped with the current time
    pub fn assemble(
        detail: BusinessDetail,
        reviews: Vec<Review>,
        carried: Option<&SearchCardSummary>,
    ) -> Self {
        assemble_record(detail, reviews, carried, Utc::now())
    }
}

/// Builds a record from a listing page's extraction results
///
/// An empty review list becomes `None`. When the listing page yielded no name
/// or no rating, the values read from the search card are used instead.
pub fn assemble_record(
    mut detail: BusinessDetail,
    reviews: Vec<Review>,
    carried: Option<&SearchCardSummary>,
    scraped_at: DateTime<Utc>,
) -> OutputRecord {
    if let Some(summary) = carried {
        if detail.business_name.is_empty() {
            if let Some(name) = &summary.business_name {
                detail.business_name = name.clone();
            }
        }
        if detail.rating.is_none() {
            detail.rating = summary.rating;
        }
    }

    OutputRecord {
        detail,
        reviews: (!reviews.is_empty()).then_some(reviews),
        scraped_at,
    }
}

/// Forwards records and failures to the configured sink
///
/// Emission never fails from the caller's point of view: sink errors are
/// logged and counted, and the record is not retried.
pub struct Emitter {
    sink: Arc<dyn RecordSink>,
    emitted: AtomicU64,
    sink_errors: AtomicU64,
}

impl Emitter {
    pub fn new(sink: Arc<dyn RecordSink>) -> Self {
        Self {
            sink,
            emitted: AtomicU64::new(0),
            sink_errors: AtomicU64::new(0),
        }
    }

    /// Hands one record to the sink; returns whether the sink accepted it
    pub fn emit(&self, record: &OutputRecord) -> bool {
        match self.sink.emit(record) {
            Ok(()) => {
                self.emitted.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(e) => {
                self.sink_errors.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(url = %record.detail.url, "Failed to write record: {}", e);
                false
            }
        }
    }

    pub fn record_failure(&self, failure: &FailedRequest) {
        if let Err(e) = self.sink.record_failure(failure) {
            tracing::warn!(url = %failure.url, "Failed to store failed request: {}", e);
        }
    }

    pub fn finalize(&self) {
        if let Err(e) = self.sink.finalize() {
            tracing::warn!("Failed to finalize output: {}", e);
        }
    }

    /// Records the sink accepted so far
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    pub fn sink_errors(&self) -> u64 {
        self.sink_errors.load(Ordering::Relaxed)
    }
}
