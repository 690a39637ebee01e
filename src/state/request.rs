//! Crawl requests and their outcomes
use crate::extract::SearchCardSummary;
use std::fmt;
use url::Url;

/// Which page type a request was created for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// A search-results page (the seed or a pagination link)
    Search,

    /// A single listing page admitted from a search card
    Detail,
}

impl RequestKind {
    /// Converts the kind to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Detail => "detail",
        }
    }

    /// Parses a kind from its database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "search" => Some(Self::Search),
            "detail" => Some(Self::Detail),
            _ => None,
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// A unit of crawl work
///
/// Detail requests carry the summary read from the search card that produced
/// them, so the emitter can fill gaps the listing page leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlRequest {
    pub url: Url,
    pub kind: RequestKind,
    pub carried_summary: Option<SearchCardSummary>,
}

impl CrawlRequest {
    /// Creates a search request
    pub fn search(url: Url) -> Self {
        Self {
            url,
            kind: RequestKind::Search,
            carried_summary: None,
        }
    }

    /// Creates a detail request carrying its search-card summary
    pub fn detail(url: Url, summary: SearchCardSummary) -> Self {
        Self {
            url,
            kind: RequestKind::Detail,
            carried_summary: Some(summary),
        }
    }
}

/// Terminal result of processing one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
    /// The page was rendered and dispatched to its handler
    Processed,

    /// The page was rendered but is neither a search nor a listing page
    Unrecognized,

    /// Every attempt failed
    Failed,
}

impl RequestOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed)
    }

    /// Converts the outcome to a database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Unrecognized => "unrecognized",
            Self::Failed => "failed",
        }
    }

    /// Parses an outcome from a database string representation
    ///
    /// Returns None if the string doesn't match any known outcome.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "processed" => Some(Self::Processed),
            "unrecognized" => Some(Self::Unrecognized),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for RequestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_carries_summary() {
        let url = Url::parse("https://www.yelp.com/biz/a").unwrap();
        let summary = SearchCardSummary {
            business_url: url.to_string(),
            business_name: Some("A".to_string()),
            rating: Some(4.0),
            review_count: None,
        };

        let request = CrawlRequest::detail(url.clone(), summary.clone());
        assert_eq!(request.kind, RequestKind::Detail);
        assert_eq!(request.carried_summary, Some(summary));

        let search = CrawlRequest::search(url);
        assert_eq!(search.kind, RequestKind::Search);
        assert!(search.carried_summary.is_none());
    }

    #[test]
    fn test_kind_roundtrip_db_string() {
        for kind in [RequestKind::Search, RequestKind::Detail] {
            assert_eq!(RequestKind::from_db_string(kind.to_db_string()), Some(kind));
        }
        assert_eq!(RequestKind::from_db_string("other"), None);
    }

    #[test]
    fn test_outcome_roundtrip_db_string() {
        for outcome in [
            RequestOutcome::Processed,
            RequestOutcome::Unrecognized,
            RequestOutcome::Failed,
        ] {
            let parsed = RequestOutcome::from_db_string(outcome.to_db_string());
            assert_eq!(Some(outcome), parsed, "Failed roundtrip for {:?}", outcome);
        }
        assert_eq!(RequestOutcome::from_db_string("invalid"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", RequestKind::Detail), "detail");
        assert_eq!(format!("{}", RequestOutcome::Failed), "failed");
        assert!(RequestOutcome::Processed.is_success());
        assert!(!RequestOutcome::Unrecognized.is_success());
    }
}
