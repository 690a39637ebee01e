//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Listing-Ripple database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    search_query TEXT NOT NULL,
    location TEXT NOT NULL,
    status TEXT NOT NULL,
    businesses_enqueued INTEGER NOT NULL DEFAULT 0,
    unique_seen INTEGER NOT NULL DEFAULT 0,
    records_emitted INTEGER NOT NULL DEFAULT 0,
    failed_requests INTEGER NOT NULL DEFAULT 0
);

-- Emitted business records; append-only, collections stored as JSON text
CREATE TABLE IF NOT EXISTS businesses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    url TEXT NOT NULL,
    business_name TEXT NOT NULL,
    rating REAL,
    review_count INTEGER NOT NULL,
    categories TEXT,
    price_range TEXT,
    address TEXT,
    phone TEXT,
    hours TEXT,
    photos TEXT NOT NULL,
    reviews TEXT,
    scraped_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_businesses_url ON businesses(url);
CREATE INDEX IF NOT EXISTS idx_businesses_run ON businesses(run_id);

-- Requests that exhausted their attempts
CREATE TABLE IF NOT EXISTS failed_requests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    url TEXT NOT NULL,
    kind TEXT NOT NULL,
    attempts INTEGER NOT NULL,
    error_message TEXT NOT NULL,
    failed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_failed_requests_run ON failed_requests(run_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
