//! Scheduler for managing the crawl frontier
//!
//! This module handles:
//! - FIFO queue management for requests to process
//! - Global concurrency limiting via semaphores
//! - The per-run request budget

use crate::config::CrawlerConfig;
use crate::state::CrawlRequest;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// A request cleared to run, holding one concurrency permit
///
/// The permit is released when this value (or the task owning it) is dropped.
pub struct ScheduledRequest {
    pub request: CrawlRequest,
    pub _permit: OwnedSemaphorePermit,
}

/// Scheduler owns the work queue and decides when a request may start
///
/// The scheduler coordinates:
/// - Global concurrency limits (requests in flight)
/// - FIFO order of dispatch
/// - The total number of requests a run may dispatch
pub struct Scheduler {
    /// Global semaphore for limiting concurrent requests
    semaphore: Arc<Semaphore>,

    /// Requests waiting to be processed, oldest first
    frontier: VecDeque<CrawlRequest>,

    /// Requests handed out so far
    dispatched: u32,

    /// Upper bound on `dispatched`
    request_budget: u32,

    /// Requests dropped because the budget ran out
    dropped: u32,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `initial_frontier` - Requests to start from (normally the seed search page)
    pub fn new(config: &CrawlerConfig, initial_frontier: Vec<CrawlRequest>) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(config.max_concurrency as usize)),
            frontier: VecDeque::from(initial_frontier),
            dispatched: 0,
            request_budget: config.request_budget(),
            dropped: 0,
        }
    }

    /// Appends requests to the back of the queue
    pub fn enqueue<I>(&mut self, requests: I)
    where
        I: IntoIterator<Item = CrawlRequest>,
    {
        self.frontier.extend(requests);
    }

    /// Takes the next request if a concurrency slot is free
    ///
    /// Never waits. Returns `None` when the queue is empty, every slot is
    /// taken, or the request budget is spent. Once the budget is spent the
    /// remaining queue is dropped.
    pub fn try_next(&mut self) -> Option<ScheduledRequest> {
        if self.frontier.is_empty() {
            return None;
        }

        if self.dispatched >= self.request_budget {
            let remaining = self.frontier.len() as u32;
            self.dropped += remaining;
            self.frontier.clear();
            tracing::warn!(
                "Request budget of {} reached, dropping {} queued requests",
                self.request_budget,
                remaining
            );
            return None;
        }

        let permit = self.semaphore.clone().try_acquire_owned().ok()?;
        let request = self.frontier.pop_front()?;
        self.dispatched += 1;

        tracing::debug!(url = %request.url, kind = %request.kind, "Dispatching request");
        Some(ScheduledRequest {
            request,
            _permit: permit,
        })
    }

    /// Returns the number of queued requests
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Returns the number of requests currently holding a permit
    pub fn in_flight(&self, max_concurrency: usize) -> usize {
        max_concurrency.saturating_sub(self.semaphore.available_permits())
    }

    pub fn dispatched(&self) -> u32 {
        self.dispatched
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}
