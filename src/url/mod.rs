//! URL handling module for Listing-Ripple
//!
//! This module provides listing-URL canonicalization, search-URL construction,
//! and page classification for the dispatcher.

mod normalize;

use crate::UrlError;
use url::Url;

// Re-export main functions
pub use normalize::{canonicalize_listing_url, resolve_against_origin};

/// Path of the site's search-results page
pub const SEARCH_PATH: &str = "/search";

/// Path prefix shared by all listing pages
pub const LISTING_PATH_PREFIX: &str = "/biz/";

/// Page classification types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// Paginated search-results page
    Search,
    /// A single business listing page
    Detail,
    /// Any other URL shape; never enqueued by the frontier
    Unknown,
}

/// Classifies a fetched URL by its path
///
/// # Examples
///
/// ```
/// use listing_ripple::url::{classify_page, PageKind};
/// use url::Url;
///
/// let url = Url::parse("https://www.yelp.com/search?find_desc=Tacos&start=0").unwrap();
/// assert_eq!(classify_page(&url), PageKind::Search);
///
/// let url = Url::parse("https://www.yelp.com/biz/la-taqueria-san-francisco").unwrap();
/// assert_eq!(classify_page(&url), PageKind::Detail);
/// ```
pub fn classify_page(url: &Url) -> PageKind {
    let path = url.path();

    if path == SEARCH_PATH || path == "/search/" {
        PageKind::Search
    } else if path.starts_with(LISTING_PATH_PREFIX) && path.len() > LISTING_PATH_PREFIX.len() {
        PageKind::Detail
    } else {
        PageKind::Unknown
    }
}

/// Builds the search URL for a query, a location and a zero-based result offset
///
/// # Examples
///
/// ```
/// use listing_ripple::url::build_search_url;
/// use url::Url;
///
/// let origin = Url::parse("https://www.yelp.com").unwrap();
/// let url = build_search_url(&origin, "Restaurants", "San Francisco, CA", 0).unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://www.yelp.com/search?find_desc=Restaurants&find_loc=San+Francisco%2C+CA&start=0"
/// );
/// ```
pub fn build_search_url(
    origin: &Url,
    search_query: &str,
    location: &str,
    offset: u32,
) -> Result<Url, UrlError> {
    let mut url = origin
        .join(SEARCH_PATH)
        .map_err(|e| UrlError::Parse(e.to_string()))?;

    url.query_pairs_mut()
        .clear()
        .append_pair("find_desc", search_query)
        .append_pair("find_loc", location)
        .append_pair("start", &offset.to_string());

    Ok(url)
}
