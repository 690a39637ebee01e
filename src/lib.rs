//! Listing-Ripple: a business-directory listing harvester
//!
//! This crate walks a directory site's paginated search results, fans out into
//! individual listing pages, and extracts structured business records (name,
//! rating, address, hours, photos, reviews) from noisy, inconsistently marked-up HTML.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Listing-Ripple operations
#[derive(Debug, Error)]
pub enum RippleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to launch browser: {0}")]
    BrowserLaunch(String),

    #[error("Browser error for {url}: {message}")]
    Browser { url: String, message: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RippleError {
    /// Returns true if a fresh attempt at the same request may succeed
    ///
    /// Transport failures, timeouts, server errors and bot-wall statuses
    /// (403, 429) are retried. Everything else fails the request immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { .. } | Self::Timeout { .. } | Self::Browser { .. } => true,
            Self::HttpStatus { status, .. } => {
                *status == 403 || *status == 429 || (500..600).contains(status)
            }
            _ => false,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing required input: {0}")]
    MissingField(&'static str),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Listing-Ripple operations
pub type Result<T> = std::result::Result<T, RippleError>;

// Re-export commonly used types
pub use config::Config;
pub use state::{Admission, CrawlRequest, RequestKind};
pub use url::{build_search_url, canonicalize_listing_url, classify_page, PageKind};
