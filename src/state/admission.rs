//! Admission gate for listing requests
//!
//! Every discovered listing passes through [`Admission::try_claim`] before a
//! detail request is created for it. The gate owns the seen-set and the count
//! of detail requests issued, so the count is an exact upper bound on the
//! listing pages the crawl will visit. Search pages are claimed the same way
//! through [`Admission::claim_search_page`], so a "next" link that loops back
//! never queues a page twice.

use std::collections::HashSet;

/// Seen-sets and result counter controlling which requests enter the frontier
#[derive(Debug, Clone)]
pub struct Admission {
    /// Canonical listing URLs admitted in this run
    seen: HashSet<String>,

    /// Listing URLs stored by earlier runs; never admitted, never counted
    carried_over: HashSet<String>,

    /// Full search-page URLs (query included) already queued
    search_pages: HashSet<String>,

    /// Detail requests admitted in this run
    business_count: u32,

    /// Upper bound on `business_count`
    max_results: u32,
}

impl Admission {
    /// Creates an empty gate with the given cap
    pub fn new(max_results: u32) -> Self {
        Self::with_seen(max_results, Vec::new())
    }

    /// Creates a gate that already treats `previously_seen` as claimed
    ///
    /// Carried-over URLs are never admitted again but do not count toward
    /// this run's cap.
    pub fn with_seen<I>(max_results: u32, previously_seen: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            seen: HashSet::new(),
            carried_over: previously_seen.into_iter().collect(),
            search_pages: HashSet::new(),
            business_count: 0,
            max_results,
        }
    }

    /// Claims a canonical listing URL
    ///
    /// Returns `true` and counts the claim if the URL is new and the cap has
    /// not been reached; returns `false` otherwise. A refused claim is not an
    /// error and leaves the gate unchanged.
    pub fn try_claim(&mut self, url: &str) -> bool {
        if self.cap_reached() || self.has_seen(url) {
            return false;
        }

        self.seen.insert(url.to_string());
        self.business_count += 1;
        true
    }

    /// Claims a search-results page by its full URL
    ///
    /// Returns `false` if the page was already claimed. The result cap does
    /// not apply here.
    pub fn claim_search_page(&mut self, url: &str) -> bool {
        self.search_pages.insert(url.to_string())
    }

    /// Returns true once `business_count` has reached the cap
    pub fn cap_reached(&self) -> bool {
        self.business_count >= self.max_results
    }

    /// Detail requests admitted in this run
    pub fn business_count(&self) -> u32 {
        self.business_count
    }

    /// Distinct listing URLs admitted in this run, excluding carried-over ones
    pub fn unique_seen(&self) -> usize {
        self.seen.len()
    }

    /// Listing URLs carried over from earlier runs
    pub fn carried_over(&self) -> usize {
        self.carried_over.len()
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    pub fn has_seen(&self, url: &str) -> bool {
        self.seen.contains(url) || self.carried_over.contains(url)
    }
}
