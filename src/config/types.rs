use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Listing-Ripple
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub site: SiteConfig,
    pub output: OutputConfig,
}

/// What to search for
///
/// Both fields are required by validation. They default to empty here so the
/// CLI can supply them when the file leaves them out.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchConfig {
    /// Free-text search query (e.g. "Restaurants")
    #[serde(rename = "search-query", default)]
    pub search_query: String,

    /// Location the search is scoped to (e.g. "San Francisco, CA")
    #[serde(default)]
    pub location: String,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlerConfig {
    /// Maximum number of listing pages to enqueue
    pub max_results: u32,

    /// Whether to extract reviews from listing pages
    pub include_reviews: bool,

    /// Review containers inspected per listing
    pub max_reviews_per_business: usize,

    /// Pacing delay before each navigation (milliseconds)
    pub delay_between_requests: u64,

    /// Total attempts per request before it is abandoned
    pub max_retries: u32,

    /// Maximum number of pages processed at once
    pub max_concurrency: u32,

    /// Timeout for a single page render (seconds)
    pub navigation_timeout_secs: u64,

    /// Timeout for one whole attempt at a request (seconds)
    pub request_timeout_secs: u64,

    /// Soft timeout for the network-quiescence wait (seconds)
    pub network_idle_timeout_secs: u64,

    /// Lower bound of the human-like delay after a page settles (milliseconds)
    pub settle_jitter_min_ms: u64,

    /// Upper bound of the human-like delay after a page settles (milliseconds)
    pub settle_jitter_max_ms: u64,

    /// Base delay for exponential retry back-off (milliseconds)
    pub retry_backoff_ms: u64,

    /// Hard ceiling on requests dispatched in one run
    pub max_requests_per_crawl: Option<u32>,

    /// How pages are rendered
    pub renderer: RendererKind,

    /// Run the browser without a window (browser renderer only)
    pub headless: bool,

    /// Browser executable; searched for on the system when unset
    pub chrome_path: Option<String>,
}

/// Page rendering backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Headless Chromium: executes scripts and waits for network idle
    #[default]
    Chromium,

    /// Plain HTTP GET with a browser-like header profile
    Http,
}

impl std::fmt::Display for RendererKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chromium => write!(f, "chromium"),
            Self::Http => write!(f, "http"),
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_results: 50,
            include_reviews: true,
            max_reviews_per_business: 5,
            delay_between_requests: 2000,
            max_retries: 3,
            max_concurrency: 2,
            navigation_timeout_secs: 60,
            request_timeout_secs: 120,
            network_idle_timeout_secs: 30,
            settle_jitter_min_ms: 1000,
            settle_jitter_max_ms: 3000,
            retry_backoff_ms: 1000,
            max_requests_per_crawl: None,
            renderer: RendererKind::default(),
            headless: true,
            chrome_path: None,
        }
    }
}

impl CrawlerConfig {
    /// Request budget for the run, defaulting to `max_results + 50`
    pub fn request_budget(&self) -> u32 {
        self.max_requests_per_crawl
            .unwrap_or_else(|| self.max_results.saturating_add(50))
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.delay_between_requests)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn network_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.network_idle_timeout_secs)
    }
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Site origin; relative listing links resolve against it
    #[serde(rename = "base-url")]
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.yelp.com".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite record store
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Optional JSON Lines mirror of every emitted record
    #[serde(rename = "jsonl-path", default)]
    pub jsonl_path: Option<String>,

    /// Optional file receiving the first search page's HTML
    #[serde(rename = "debug-html-path", default)]
    pub debug_html_path: Option<String>,
}

/// Search inputs supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct SearchOverrides {
    pub search_query: Option<String>,
    pub location: Option<String>,
}

impl SearchOverrides {
    /// Replaces the configured search inputs with any provided overrides
    pub fn apply(&self, search: &mut SearchConfig) {
        if let Some(query) = &self.search_query {
            search.search_query = query.clone();
        }
        if let Some(location) = &self.location {
            search.location = location.clone();
        }
    }
}
