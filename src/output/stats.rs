//! Statistics generation from the record database
//!
//! This module provides functionality for extracting and displaying
//! run and record statistics from the storage layer.

use crate::storage::{RunRecord, Storage};
use crate::RippleError;

/// Number of categories listed in the statistics report
pub const TOP_CATEGORY_LIMIT: usize = 10;

/// Record database statistics
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Most recent run, if any run was started
    pub latest_run: Option<RunRecord>,

    /// Stored business records across all runs
    pub total_records: u64,

    /// Distinct listing URLs across all runs
    pub unique_businesses: u64,

    pub average_rating: Option<f64>,

    /// Most frequent categories and their record counts
    pub top_categories: Vec<(String, u64)>,

    /// Failed requests of the latest run
    pub latest_run_failures: usize,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(RippleError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> Result<CrawlStatistics, RippleError> {
    let latest_run = storage.get_latest_run()?;
    let latest_run_failures = match &latest_run {
        Some(run) => storage.get_failed_requests(run.id)?.len(),
        None => 0,
    };

    Ok(CrawlStatistics {
        latest_run,
        total_records: storage.count_businesses()?,
        unique_businesses: storage.count_unique_businesses()?,
        average_rating: storage.average_rating()?,
        top_categories: storage.top_categories(TOP_CATEGORY_LIMIT)?,
        latest_run_failures,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Listing Statistics ===\n");

    println!("Overview:");
    println!("  Records stored: {}", stats.total_records);
    println!("  Unique businesses: {}", stats.unique_businesses);
    match stats.average_rating {
        Some(rating) => println!("  Average rating: {:.2}", rating),
        None => println!("  Average rating: n/a"),
    }
    println!();

    if let Some(run) = &stats.latest_run {
        println!("Latest Run (#{}):", run.id);
        println!("  Search: {} in {}", run.search_query, run.location);
        println!("  Status: {}", run.status.to_db_string());
        println!("  Started: {}", run.started_at);
        if let Some(finished) = &run.finished_at {
            println!("  Finished: {}", finished);
        }
        println!("  Businesses enqueued: {}", run.counts.businesses_enqueued);
        println!("  Unique businesses seen this run: {}", run.counts.unique_seen);
        println!("  Records emitted: {}", run.counts.records_emitted);
        println!("  Failed requests: {}", stats.latest_run_failures);
        println!();
    }

    if !stats.top_categories.is_empty() {
        println!("Top Categories:");
        for (category, count) in &stats.top_categories {
            let percentage = if stats.total_records > 0 {
                (*count as f64 / stats.total_records as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", category, count, percentage);
        }
    }
}
