//! Page classification and per-kind handling
//!
//! A rendered page is routed by its request URL: search pages admit new
//! listings through the admission gate and may queue the next page, listing
//! pages are extracted and emitted. Anything else is dropped with a warning.

use crate::crawler::fetcher::RenderedPage;
use crate::extract::{
    extract_business_detail, extract_reviews, extract_search_cards, find_next_page,
    SearchCardSummary, CARD_SELECTOR,
};
use crate::output::{Emitter, OutputRecord};
use crate::state::{Admission, CrawlRequest, RequestOutcome};
use crate::url::{classify_page, PageKind};
use scraper::Html;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use url::Url;

/// What handling one page produced
#[derive(Debug)]
pub struct Dispatched {
    pub outcome: RequestOutcome,
    /// New requests to append to the frontier
    pub follow_ups: Vec<CrawlRequest>,
}

/// Routes rendered pages to their handlers
pub struct Dispatcher {
    origin: Url,
    include_reviews: bool,
    max_reviews: usize,
    admission: Arc<Mutex<Admission>>,
    emitter: Arc<Emitter>,
    debug_html_path: Option<PathBuf>,
    debug_dumped: AtomicBool,
}

impl Dispatcher {
    pub fn new(
        origin: Url,
        include_reviews: bool,
        max_reviews: usize,
        admission: Arc<Mutex<Admission>>,
        emitter: Arc<Emitter>,
        debug_html_path: Option<PathBuf>,
    ) -> Self {
        Self {
            origin,
            include_reviews,
            max_reviews,
            admission,
            emitter,
            debug_html_path,
            debug_dumped: AtomicBool::new(false),
        }
    }

    /// Handles one rendered page
    ///
    /// Never fails: extraction has an absent value for every field, and an
    /// unrecognized page is reported through the outcome.
    pub fn dispatch(&self, request: &CrawlRequest, page: &RenderedPage) -> Dispatched {
        match classify_page(&request.url) {
            PageKind::Search => Dispatched {
                outcome: RequestOutcome::Processed,
                follow_ups: self.handle_search(&request.url, &page.html),
            },
            PageKind::Detail => {
                self.handle_detail(request, &page.html);
                Dispatched {
                    outcome: RequestOutcome::Processed,
                    follow_ups: Vec::new(),
                }
            }
            PageKind::Unknown => {
                tracing::warn!(
                    url = %request.url,
                    kind = %request.kind,
                    "Dropping request for a page that is neither a search nor a listing page"
                );
                Dispatched {
                    outcome: RequestOutcome::Unrecognized,
                    follow_ups: Vec::new(),
                }
            }
        }
    }

    fn lock_admission(&self) -> MutexGuard<'_, Admission> {
        // try_claim cannot leave the gate half-updated, so a poisoned lock is still usable
        self.admission.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn handle_search(&self, url: &Url, html: &str) -> Vec<CrawlRequest> {
        tracing::info!(url = %url, "Processing search page");

        let document = Html::parse_document(html);
        self.dump_first_search_page(html, &document);

        let cards = extract_search_cards(&document, &self.origin);
        let next_page = find_next_page(&document, &self.origin);
        let card_count = cards.len();

        let mut follow_ups = Vec::new();
        let pagination = {
            let mut admission = self.lock_admission();
            admission.claim_search_page(url.as_str());
            for card in cards {
                if let Some(request) = admit(&mut admission, card) {
                    follow_ups.push(request);
                }
            }

            if admission.cap_reached() {
                Pagination::CapReached
            } else {
                match next_page {
                    Some(next) if admission.claim_search_page(next.as_str()) => {
                        Pagination::Next(next)
                    }
                    Some(next) => Pagination::AlreadyQueued(next),
                    None => Pagination::LastPage,
                }
            }
        };

        tracing::info!(
            "Found {} cards, {} new businesses admitted",
            card_count,
            follow_ups.len()
        );

        match pagination {
            Pagination::Next(next) => {
                tracing::info!(url = %next, "Queueing next search page");
                follow_ups.push(CrawlRequest::search(next));
            }
            Pagination::AlreadyQueued(next) => {
                tracing::info!(url = %next, "Next search page already visited, stopping pagination");
            }
            Pagination::CapReached => {
                tracing::debug!("Result cap reached, not following pagination");
            }
            Pagination::LastPage => tracing::info!("No more search pages found"),
        }

        follow_ups
    }

    fn handle_detail(&self, request: &CrawlRequest, html: &str) {
        tracing::info!(url = %request.url, "Processing business");

        let (detail, reviews) = {
            let document = Html::parse_document(html);
            let detail = extract_business_detail(&document, &request.url);
            let reviews = if self.include_reviews {
                extract_reviews(&document, self.max_reviews)
            } else {
                Vec::new()
            };
            (detail, reviews)
        };

        let record = OutputRecord::assemble(detail, reviews, request.carried_summary.as_ref());
        if !self.emitter.emit(&record) {
            return;
        }

        let rating = record
            .detail
            .rating
            .map_or_else(|| "n/a".to_string(), |r| r.to_string());
        tracing::info!(
            "Saved: {} (rating {}, {} reviews)",
            record.detail.business_name,
            rating,
            record.detail.review_count
        );

        let (admitted, max_results) = {
            let admission = self.lock_admission();
            (admission.business_count(), admission.max_results().max(1))
        };
        let percent = (admitted as f64 / max_results as f64 * 100.0).round();
        tracing::info!("Progress: {}/{} ({}%)", admitted, max_results, percent);
    }

    /// Writes the first search page of the run to the debug path, if one is set
    fn dump_first_search_page(&self, html: &str, document: &Html) {
        let Some(path) = &self.debug_html_path else {
            return;
        };
        if self.debug_dumped.swap(true, Ordering::SeqCst) {
            return;
        }

        match std::fs::write(path, html) {
            Ok(()) => tracing::info!("Saved search page HTML to {}", path.display()),
            Err(e) => tracing::warn!("Failed to save search page HTML to {}: {}", path.display(), e),
        }

        let any_test_id = crate::extract::selector("div[data-testid]");
        let test_ids: BTreeSet<&str> = document
            .select(&any_test_id)
            .take(20)
            .filter_map(|el| el.value().attr("data-testid"))
            .collect();

        tracing::debug!(
            "Found {} result cards, {} elements with data-testid; sample ids: {}",
            document.select(&CARD_SELECTOR).count(),
            document.select(&any_test_id).count(),
            test_ids.into_iter().collect::<Vec<_>>().join(", ")
        );
    }
}

/// What a search page means for pagination, decided under the admission lock
enum Pagination {
    Next(Url),
    AlreadyQueued(Url),
    CapReached,
    LastPage,
}

/// Turns a card into a detail request if the gate admits its listing
fn admit(admission: &mut Admission, card: SearchCardSummary) -> Option<CrawlRequest> {
    let url = match Url::parse(&card.business_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("Skipping card with invalid URL {}: {}", card.business_url, e);
            return None;
        }
    };

    admission
        .try_claim(&card.business_url)
        .then(|| CrawlRequest::detail(url, card))
}
