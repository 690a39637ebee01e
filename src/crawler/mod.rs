//! Crawler module: the crawl driver and everything it runs per request
//!
//! This module contains the core crawling logic, including:
//! - Page rendering behind the [`Renderer`] seam (headless Chromium or plain HTTP)
//! - Retry with exponential back-off
//! - FIFO scheduling under a concurrency cap and a request budget
//! - Page classification and dispatch to the extraction layer
//! - Overall crawl coordination

mod browser;
mod coordinator;
mod dispatcher;
mod fetcher;
mod retry;
mod scheduler;

pub use browser::{find_browser_executable, ChromiumRenderer};
pub use coordinator::{describe_settings, run_crawl, Coordinator, CrawlReport};
pub use dispatcher::{Dispatched, Dispatcher};
pub use fetcher::{
    build_http_client, random_user_agent, settle_within, HttpRenderer, RenderedPage, Renderer,
    Settle, USER_AGENTS,
};
pub use retry::{with_retries, Exhausted, RetryPolicy};
pub use scheduler::{ScheduledRequest, Scheduler};
