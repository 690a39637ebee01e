//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Initializing storage, sinks and the admission gate
//! - Draining the frontier under the concurrency cap
//! - Pacing, rendering, settling and retrying each request
//! - Recording the final run counters

use crate::config::{Config, CrawlerConfig, RendererKind};
use crate::crawler::browser::ChromiumRenderer;
use crate::crawler::dispatcher::{Dispatched, Dispatcher};
use crate::crawler::fetcher::{HttpRenderer, RenderedPage, Renderer, Settle};
use crate::crawler::retry::{with_retries, RetryPolicy};
use crate::crawler::scheduler::{ScheduledRequest, Scheduler};
use crate::output::{Emitter, FailedRequest, JsonLinesSink, MultiSink, RecordSink, SqliteSink};
use crate::state::{Admission, CrawlRequest, RequestOutcome};
use crate::storage::{
    open_storage, RunCounts, RunStatus, SqliteStorage, Storage, StorageError,
};
use crate::url::build_search_url;
use crate::RippleError;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use url::Url;

/// Final counters of a crawl
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlReport {
    /// Detail requests admitted (the "businesses scraped" count)
    pub businesses_enqueued: u32,
    /// Distinct listing URLs seen by this run, excluding carried-over ones
    pub unique_seen: usize,
    /// Listing URLs preloaded from earlier runs
    pub carried_over: usize,
    pub records_emitted: u64,
    pub failed_requests: u64,
    pub unrecognized_pages: u64,
    pub requests_dispatched: u32,
    pub dropped_over_budget: u32,
}

impl CrawlReport {
    pub fn run_counts(&self) -> RunCounts {
        RunCounts {
            businesses_enqueued: self.businesses_enqueued,
            unique_seen: self.unique_seen as u64,
            records_emitted: self.records_emitted,
            failed_requests: self.failed_requests,
        }
    }
}

/// Per-request processing shared by all crawl tasks
struct Worker<R> {
    renderer: R,
    dispatcher: Dispatcher,
    emitter: Arc<Emitter>,
    retry: RetryPolicy,
    pacing: Duration,
    request_timeout: Duration,
    idle_timeout: Duration,
    settle_jitter_ms: (u64, u64),
    failed: AtomicU64,
    unrecognized: AtomicU64,
}

impl<R: Renderer> Worker<R> {
    /// Processes one request to completion and returns the requests it produced
    ///
    /// Failures end here: an exhausted request is logged once, handed to the
    /// sink and produces nothing.
    async fn process(&self, request: CrawlRequest) -> Vec<CrawlRequest> {
        let url = request.url.to_string();
        let result = with_retries(&self.retry, &url, |attempt| self.attempt(&request, attempt)).await;

        let (outcome, follow_ups) = match result {
            Ok(Dispatched {
                outcome,
                follow_ups,
            }) => {
                if outcome == RequestOutcome::Unrecognized {
                    self.unrecognized.fetch_add(1, Ordering::Relaxed);
                }
                (outcome, follow_ups)
            }
            Err(exhausted) => {
                tracing::error!(
                    url = %url,
                    kind = %request.kind,
                    attempts = exhausted.attempts,
                    "Request failed after {} attempts: {}",
                    exhausted.attempts,
                    exhausted.error
                );
                self.failed.fetch_add(1, Ordering::Relaxed);
                self.emitter.record_failure(&FailedRequest {
                    url: url.clone(),
                    kind: request.kind,
                    attempts: exhausted.attempts,
                    error: exhausted.error.to_string(),
                });
                (RequestOutcome::Failed, Vec::new())
            }
        };

        tracing::debug!(
            url = %url,
            outcome = %outcome,
            success = outcome.is_success(),
            follow_ups = follow_ups.len(),
            "Request finished"
        );
        follow_ups
    }

    /// One attempt: pacing delay, then render and settle under the request timeout, then dispatch
    async fn attempt(&self, request: &CrawlRequest, attempt: u32) -> Result<Dispatched, RippleError> {
        tracing::debug!(url = %request.url, attempt, "Starting attempt");

        if !self.pacing.is_zero() {
            tokio::time::sleep(self.pacing).await;
        }

        let page = tokio::time::timeout(self.request_timeout, self.render_and_settle(&request.url))
            .await
            .map_err(|_| RippleError::Timeout {
                url: request.url.to_string(),
            })??;

        Ok(self.dispatcher.dispatch(request, &page))
    }

    async fn render_and_settle(&self, url: &Url) -> Result<RenderedPage, RippleError> {
        let page = self.renderer.render(url, self.idle_timeout).await?;

        if page.settle == Settle::TimedOut {
            tracing::warn!(url = %url, "Network idle timeout, continuing anyway");
        }

        let jitter = self.settle_jitter();
        if !jitter.is_zero() {
            tokio::time::sleep(jitter).await;
        }

        Ok(page)
    }

    /// Random human-like pause after the page settles
    fn settle_jitter(&self) -> Duration {
        let (min, max) = self.settle_jitter_ms;
        if max <= min {
            return Duration::from_millis(min);
        }
        Duration::from_millis(rand::random_range(min..=max))
    }
}

/// Main crawler coordinator structure
///
/// Owns the frontier; crawl tasks share the worker, the admission gate and
/// the emitter.
pub struct Coordinator<R> {
    worker: Arc<Worker<R>>,
    scheduler: Scheduler,
    admission: Arc<Mutex<Admission>>,
    emitter: Arc<Emitter>,
    seed: Url,
    max_results: u32,
    max_concurrency: usize,
}

impl<R: Renderer> Coordinator<R> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `renderer` - Renders pages for the crawl tasks
    /// * `sink` - Receives emitted records and failed requests
    /// * `previously_seen` - Listing URLs that must not be admitted again
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run from the seed search page
    /// * `Err(RippleError)` - The site origin or seed URL is invalid
    pub fn new(
        config: &Config,
        renderer: R,
        sink: Arc<dyn RecordSink>,
        previously_seen: Vec<String>,
    ) -> Result<Self, RippleError> {
        let crawler = &config.crawler;
        let origin = Url::parse(&config.site.base_url)?;
        let seed = build_search_url(
            &origin,
            &config.search.search_query,
            &config.search.location,
            0,
        )?;

        let mut admission = Admission::with_seen(crawler.max_results, previously_seen);
        admission.claim_search_page(seed.as_str());
        let admission = Arc::new(Mutex::new(admission));
        let emitter = Arc::new(Emitter::new(sink));
        let dispatcher = Dispatcher::new(
            origin,
            crawler.include_reviews,
            crawler.max_reviews_per_business,
            Arc::clone(&admission),
            Arc::clone(&emitter),
            config.output.debug_html_path.as_ref().map(PathBuf::from),
        );

        let worker = Worker {
            renderer,
            dispatcher,
            emitter: Arc::clone(&emitter),
            retry: RetryPolicy::from_config(crawler),
            pacing: crawler.pacing_delay(),
            request_timeout: crawler.request_timeout(),
            idle_timeout: crawler.network_idle_timeout(),
            settle_jitter_ms: (crawler.settle_jitter_min_ms, crawler.settle_jitter_max_ms),
            failed: AtomicU64::new(0),
            unrecognized: AtomicU64::new(0),
        };

        Ok(Self {
            worker: Arc::new(worker),
            scheduler: Scheduler::new(crawler, vec![CrawlRequest::search(seed.clone())]),
            admission,
            emitter,
            seed,
            max_results: crawler.max_results,
            max_concurrency: crawler.max_concurrency as usize,
        })
    }

    /// The first search page of the crawl
    pub fn seed(&self) -> &Url {
        &self.seed
    }

    /// Runs the main crawl loop until the frontier is drained
    ///
    /// Requests start as soon as a concurrency slot is free; each finished
    /// request's follow-ups are appended to the queue. Individual request
    /// failures never end the crawl.
    pub async fn run(mut self) -> CrawlReport {
        tracing::info!(url = %self.seed, "Starting crawl (max {} businesses)", self.max_results);
        let start_time = Instant::now();
        let mut tasks = JoinSet::new();

        loop {
            while let Some(scheduled) = self.scheduler.try_next() {
                let worker = Arc::clone(&self.worker);
                tasks.spawn(async move {
                    let ScheduledRequest { request, _permit } = scheduled;
                    worker.process(request).await
                });
            }

            tracing::debug!(
                queued = self.scheduler.frontier_size(),
                in_flight = self.scheduler.in_flight(self.max_concurrency),
                "Waiting for a request to finish"
            );

            match tasks.join_next().await {
                Some(Ok(follow_ups)) => self.scheduler.enqueue(follow_ups),
                Some(Err(e)) => tracing::error!("Crawl task ended abnormally: {}", e),
                None => break,
            }
        }

        self.emitter.finalize();

        let report = self.report();
        tracing::info!(
            "Crawl completed in {:?}: {} businesses scraped, {} unique businesses seen this run (excluding {} carried over), {} records emitted, {} failed requests",
            start_time.elapsed(),
            report.businesses_enqueued,
            report.unique_seen,
            report.carried_over,
            report.records_emitted,
            report.failed_requests
        );
        report
    }

    fn report(&self) -> CrawlReport {
        let admission = self.admission.lock().unwrap_or_else(PoisonError::into_inner);
        CrawlReport {
            businesses_enqueued: admission.business_count(),
            unique_seen: admission.unique_seen(),
            carried_over: admission.carried_over(),
            records_emitted: self.emitter.emitted(),
            failed_requests: self.worker.failed.load(Ordering::Relaxed),
            unrecognized_pages: self.worker.unrecognized.load(Ordering::Relaxed),
            requests_dispatched: self.scheduler.dispatched(),
            dropped_over_budget: self.scheduler.dropped(),
        }
    }
}

/// Runs a complete crawl against the live site
///
/// This function orchestrates the entire crawl process:
///
/// 1. Open the record database and, unless `fresh`, load the listings it already holds
/// 2. Create a run row
/// 3. Build the sinks (SQLite, plus JSON Lines when configured) and the configured renderer
/// 4. Crawl from the seed search page
/// 5. Store the final counters on the run
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `config_hash` - SHA-256 of the configuration file, stored on the run
/// * `fresh` - Ignore listings stored by earlier runs
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The crawl ran to completion
/// * `Err(RippleError)` - Setup (including the browser launch) or final bookkeeping failed
///
/// # Example
///
/// ```no_run
/// use listing_ripple::config::{load_config_with_hash, SearchOverrides};
/// use listing_ripple::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("config.toml"), &SearchOverrides::default())?;
/// let report = run_crawl(config, &hash, false).await?;
/// println!("{} records", report.records_emitted);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Config,
    config_hash: &str,
    fresh: bool,
) -> Result<CrawlReport, RippleError> {
    let origin = Url::parse(&config.site.base_url)?;
    match config.crawler.renderer {
        RendererKind::Chromium => {
            let renderer = ChromiumRenderer::launch(&origin, &config.crawler).await?;
            crawl_with(config, config_hash, fresh, renderer).await
        }
        RendererKind::Http => {
            let renderer = HttpRenderer::new(&origin, config.crawler.navigation_timeout())?;
            crawl_with(config, config_hash, fresh, renderer).await
        }
    }
}

async fn crawl_with<R: Renderer>(
    config: Config,
    config_hash: &str,
    fresh: bool,
    renderer: R,
) -> Result<CrawlReport, RippleError> {
    let mut storage = open_storage(Path::new(&config.output.database_path))?;

    let previously_seen = if fresh {
        Vec::new()
    } else {
        storage.load_business_urls()?
    };
    if !previously_seen.is_empty() {
        tracing::info!(
            "Skipping {} businesses already stored by earlier runs",
            previously_seen.len()
        );
    }

    let mut sinks: Vec<Box<dyn RecordSink>> = Vec::new();
    if let Some(path) = &config.output.jsonl_path {
        sinks.push(Box::new(JsonLinesSink::open(Path::new(path))?));
    }

    let run_id = storage.create_run(
        config_hash,
        &config.search.search_query,
        &config.search.location,
    )?;
    let storage = Arc::new(Mutex::new(storage));
    sinks.insert(0, Box::new(SqliteSink::new(storage.clone(), run_id)));
    let sink: Arc<dyn RecordSink> = Arc::new(MultiSink::new(sinks));

    let coordinator = match Coordinator::new(&config, renderer, sink, previously_seen) {
        Ok(coordinator) => coordinator,
        Err(e) => {
            finish_run(&storage, run_id, RunStatus::Failed, &RunCounts::default())?;
            return Err(e);
        }
    };

    let report = coordinator.run().await;
    finish_run(&storage, run_id, RunStatus::Completed, &report.run_counts())?;

    Ok(report)
}

fn finish_run(
    storage: &Mutex<SqliteStorage>,
    run_id: i64,
    status: RunStatus,
    counts: &RunCounts,
) -> Result<(), RippleError> {
    let mut storage = storage.lock().map_err(|_| StorageError::LockPoisoned)?;
    storage.finish_run(run_id, status, counts)?;
    Ok(())
}

/// Effective crawl settings, for `--dry-run`
pub fn describe_settings(crawler: &CrawlerConfig) -> Vec<(&'static str, String)> {
    vec![
        ("renderer", crawler.renderer.to_string()),
        ("max results", crawler.max_results.to_string()),
        ("include reviews", crawler.include_reviews.to_string()),
        ("reviews per business", crawler.max_reviews_per_business.to_string()),
        ("concurrency", crawler.max_concurrency.to_string()),
        ("attempts per request", crawler.max_retries.to_string()),
        ("request budget", crawler.request_budget().to_string()),
        ("pacing delay", format!("{} ms", crawler.delay_between_requests)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OutputConfig, SearchConfig, SiteConfig};
    use crate::output::test_support::MemorySink;
    use std::collections::HashMap;

    const ORIGIN: &str = "https://www.yelp.com";

    /// Serves pages from a map; a URL can be made to fail a number of times first
    #[derive(Default)]
    struct FakeRenderer {
        pages: HashMap<String, String>,
        failures: Mutex<HashMap<String, u32>>,
        calls: Mutex<Vec<String>>,
        settle_times_out: bool,
    }

    impl FakeRenderer {
        fn page(mut self, url: &str, html: String) -> Self {
            self.pages.insert(url.to_string(), html);
            self
        }

        fn failing(self, url: &str, times: u32) -> Self {
            self.failures.lock().unwrap().insert(url.to_string(), times);
            self
        }

        fn calls_to(&self, url: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
        }

        fn calls_containing(&self, fragment: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|u| u.contains(fragment))
                .count()
        }
    }

    impl Renderer for FakeRenderer {
        async fn render(&self, url: &Url, _settle_timeout: Duration) -> Result<RenderedPage, RippleError> {
            self.calls.lock().unwrap().push(url.to_string());

            if let Some(remaining) = self.failures.lock().unwrap().get_mut(url.as_str()) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(RippleError::HttpStatus {
                        url: url.to_string(),
                        status: 503,
                    });
                }
            }

            match self.pages.get(url.as_str()) {
                Some(html) => Ok(RenderedPage {
                    final_url: url.clone(),
                    status: 200,
                    html: html.clone(),
                    settle: if self.settle_times_out {
                        Settle::TimedOut
                    } else {
                        Settle::Quiescent
                    },
                }),
                None => Err(RippleError::HttpStatus {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    fn config(max_results: u32) -> Config {
        Config {
            search: SearchConfig {
                search_query: "pizza".to_string(),
                location: "San Francisco, CA".to_string(),
            },
            crawler: CrawlerConfig {
                max_results,
                delay_between_requests: 0,
                settle_jitter_min_ms: 0,
                settle_jitter_max_ms: 0,
                retry_backoff_ms: 0,
                ..CrawlerConfig::default()
            },
            site: SiteConfig {
                base_url: ORIGIN.to_string(),
            },
            output: OutputConfig {
                database_path: "unused.db".to_string(),
                jsonl_path: None,
                debug_html_path: None,
            },
        }
    }

    fn search_url(offset: u32) -> String {
        build_search_url(
            &Url::parse(ORIGIN).unwrap(),
            "pizza",
            "San Francisco, CA",
            offset,
        )
        .unwrap()
        .to_string()
    }

    fn biz(slug: &str) -> String {
        format!("{}/biz/{}", ORIGIN, slug)
    }

    fn search_html(slugs: &[&str], next: Option<String>) -> String {
        let cards: String = slugs
            .iter()
            .map(|slug| {
                format!(
                    r#"<div data-testid="serp-ia-card"><a href="/biz/{0}?osq=pizza">{0}</a></div>"#,
                    slug
                )
            })
            .collect();
        let next = next
            .map(|href| format!(r#"<a aria-label="Next Page" href="{}">Next</a>"#, href))
            .unwrap_or_default();
        format!("<html><body>{}{}</body></html>", cards, next)
    }

    fn detail_html(name: &str) -> String {
        format!(
            r#"<html><body><h1>{}</h1><div role="img" aria-label="4 star rating"></div><span>87 reviews</span></body></html>"#,
            name
        )
    }

    fn with_details(mut renderer: FakeRenderer, slugs: &[&str]) -> FakeRenderer {
        for slug in slugs {
            renderer = renderer.page(&biz(slug), detail_html(slug));
        }
        renderer
    }

    async fn crawl(
        config: &Config,
        renderer: FakeRenderer,
        previously_seen: Vec<String>,
    ) -> (CrawlReport, Arc<MemorySink>, Arc<FakeRenderer>) {
        let sink = Arc::new(MemorySink::default());
        let renderer = Arc::new(renderer);
        let coordinator = Coordinator::new(
            config,
            SharedRenderer(Arc::clone(&renderer)),
            sink.clone(),
            previously_seen,
        )
        .unwrap();
        let report = coordinator.run().await;
        (report, sink, renderer)
    }

    /// Lets a test keep a handle on the renderer it gave away
    struct SharedRenderer(Arc<FakeRenderer>);

    impl Renderer for SharedRenderer {
        fn render(
            &self,
            url: &Url,
            settle_timeout: Duration,
        ) -> impl std::future::Future<Output = Result<RenderedPage, RippleError>> + Send {
            self.0.render(url, settle_timeout)
        }
    }

    #[tokio::test]
    async fn test_cap_limits_detail_requests_and_pagination() {
        let slugs = ["a", "b", "c", "d", "e", "f", "g", "h"];
        let renderer = with_details(FakeRenderer::default(), &slugs).page(
            &search_url(0),
            search_html(&slugs, Some("/search?find_desc=pizza&start=10".to_string())),
        );

        let (report, sink, renderer) = crawl(&config(5), renderer, vec![]).await;

        assert_eq!(report.businesses_enqueued, 5);
        assert_eq!(report.records_emitted, 5);
        assert_eq!(sink.records().len(), 5);
        assert_eq!(renderer.calls_containing("/biz/"), 5);
        assert_eq!(renderer.calls_containing("start=10"), 0);
        assert_eq!(report.failed_requests, 0);
    }

    #[tokio::test]
    async fn test_exhausted_request_logged_once_and_crawl_continues() {
        let renderer = with_details(FakeRenderer::default(), &["a", "b"])
            .page(&search_url(0), search_html(&["a", "b"], None))
            .failing(&biz("a"), 3);

        let (report, sink, renderer) = crawl(&config(10), renderer, vec![]).await;

        assert_eq!(renderer.calls_to(&biz("a")), 3);
        assert_eq!(report.failed_requests, 1);
        assert_eq!(report.records_emitted, 1);

        let failures = sink.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].url, biz("a"));
        assert_eq!(failures[0].attempts, 3);
        assert_eq!(sink.records()[0].detail.url, biz("b"));
    }

    #[tokio::test]
    async fn test_transient_failure_recovers() {
        let renderer = with_details(FakeRenderer::default(), &["a"])
            .page(&search_url(0), search_html(&["a"], None))
            .failing(&biz("a"), 2);

        let (report, sink, _) = crawl(&config(10), renderer, vec![]).await;

        assert_eq!(report.failed_requests, 0);
        assert_eq!(sink.records().len(), 1);
    }

    #[tokio::test]
    async fn test_pagination_and_cross_page_dedup() {
        let next = "/search?find_desc=pizza&find_loc=San+Francisco%2C+CA&start=10";
        let renderer = with_details(FakeRenderer::default(), &["a", "b", "c"])
            .page(
                &search_url(0),
                search_html(&["a", "b"], Some(next.to_string())),
            )
            .page(&format!("{}{}", ORIGIN, next), search_html(&["b", "c"], None));

        let (report, sink, renderer) = crawl(&config(10), renderer, vec![]).await;

        assert_eq!(report.businesses_enqueued, 3);
        assert_eq!(report.unique_seen, 3);
        assert_eq!(renderer.calls_to(&biz("b")), 1);
        let mut urls: Vec<String> = sink.records().into_iter().map(|r| r.detail.url).collect();
        urls.sort();
        assert_eq!(urls, vec![biz("a"), biz("b"), biz("c")]);
    }

    #[tokio::test]
    async fn test_previously_seen_listings_skipped() {
        let renderer = with_details(FakeRenderer::default(), &["a", "b"])
            .page(&search_url(0), search_html(&["a", "b"], None));

        let (report, sink, renderer) = crawl(&config(10), renderer, vec![biz("a")]).await;

        assert_eq!(renderer.calls_to(&biz("a")), 0);
        assert_eq!(report.businesses_enqueued, 1);
        assert_eq!(report.unique_seen, 1);
        assert_eq!(report.carried_over, 1);
        assert_eq!(sink.records().len(), 1);
    }

    #[tokio::test]
    async fn test_search_pages_linking_in_a_cycle_fetched_once() {
        let second = "/search?find_desc=pizza&find_loc=San+Francisco%2C+CA&start=10";
        let first = "/search?find_desc=pizza&find_loc=San+Francisco%2C+CA&start=0";
        let renderer = with_details(FakeRenderer::default(), &["a", "b"])
            .page(&search_url(0), search_html(&["a"], Some(second.to_string())))
            .page(&format!("{}{}", ORIGIN, second), search_html(&["b"], Some(first.to_string())));

        let (report, sink, renderer) = crawl(&config(50), renderer, vec![]).await;

        assert_eq!(renderer.calls_containing("/search"), 2);
        assert_eq!(renderer.calls_to(&search_url(0)), 1);
        assert_eq!(report.records_emitted, 2);
        assert_eq!(sink.records().len(), 2);
        assert_eq!(report.dropped_over_budget, 0);
        assert_eq!(report.requests_dispatched, 4);
    }

    #[tokio::test]
    async fn test_unrecognized_page_dropped() {
        let renderer = FakeRenderer::default()
            .page(&search_url(0), search_html(&[], Some("/about".to_string())))
            .page(&format!("{}/about", ORIGIN), "<html></html>".to_string());

        let (report, sink, _) = crawl(&config(10), renderer, vec![]).await;

        assert_eq!(report.unrecognized_pages, 1);
        assert_eq!(report.failed_requests, 0);
        assert!(sink.records().is_empty());
    }

    #[tokio::test]
    async fn test_settle_timeout_is_not_a_failure() {
        let mut renderer = with_details(FakeRenderer::default(), &["a"])
            .page(&search_url(0), search_html(&["a"], None));
        renderer.settle_times_out = true;

        let (report, sink, _) = crawl(&config(10), renderer, vec![]).await;

        assert_eq!(report.failed_requests, 0);
        assert_eq!(sink.records().len(), 1);
    }

    #[tokio::test]
    async fn test_request_budget() {
        let mut config = config(10);
        config.crawler.max_requests_per_crawl = Some(2);
        let renderer = with_details(FakeRenderer::default(), &["a", "b", "c"])
            .page(&search_url(0), search_html(&["a", "b", "c"], None));

        let (report, sink, _) = crawl(&config, renderer, vec![]).await;

        assert_eq!(report.requests_dispatched, 2);
        assert_eq!(report.dropped_over_budget, 2);
        assert_eq!(sink.records().len(), 1);
    }

    #[test]
    fn test_run_counts() {
        let report = CrawlReport {
            businesses_enqueued: 4,
            unique_seen: 6,
            records_emitted: 3,
            failed_requests: 1,
            ..CrawlReport::default()
        };
        assert_eq!(
            report.run_counts(),
            RunCounts {
                businesses_enqueued: 4,
                unique_seen: 6,
                records_emitted: 3,
                failed_requests: 1,
            }
        );
    }
}
