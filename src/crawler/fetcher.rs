//! Page rendering
//!
//! This module handles:
//! - The `Renderer` seam the driver fetches pages through
//! - An HTTP implementation carrying the browser-like header profile
//! - Classification of transport failures into retryable errors

use crate::RippleError;
use rand::seq::IndexedRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Desktop browser user agents; one is picked per request
pub const USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const CLIENT_HINT_BRANDS: &str = r#""Chromium";v="120", "Not_A Brand";v="99""#;

/// A rendered page ready for extraction
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// URL after redirects
    pub final_url: Url,
    pub status: u16,
    pub html: String,
    /// How the wait for network quiescence ended
    pub settle: Settle,
}

/// How the wait for network quiescence ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    /// The page stopped loading resources within the timeout
    Quiescent,

    /// The timeout elapsed first; the page is used as it is
    TimedOut,
}

/// Turns a URL into a fully rendered document
///
/// Implementations must be shareable across crawl tasks.
pub trait Renderer: Send + Sync + 'static {
    /// Navigates to `url` and returns the rendered document
    ///
    /// After navigation the renderer waits, at most `settle_timeout`, for the
    /// page's network activity to stop. Running out of time is not an error:
    /// the document is captured as it is and `settle` says so.
    fn render(
        &self,
        url: &Url,
        settle_timeout: Duration,
    ) -> impl Future<Output = Result<RenderedPage, RippleError>> + Send;
}

/// Runs `wait` for at most `timeout`
pub async fn settle_within<F>(timeout: Duration, wait: F) -> Settle
where
    F: Future<Output = ()>,
{
    match tokio::time::timeout(timeout, wait).await {
        Ok(()) => Settle::Quiescent,
        Err(_) => Settle::TimedOut,
    }
}

/// Builds the HTTP client used for page fetches
///
/// The client carries the fixed header profile; the user agent and referer
/// are set per request.
///
/// # Arguments
///
/// * `navigation_timeout` - Upper bound on one whole HTTP exchange
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(navigation_timeout: Duration) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert("sec-ch-ua", HeaderValue::from_static(CLIENT_HINT_BRANDS));
    headers.insert("sec-ch-ua-mobile", HeaderValue::from_static("?0"));
    headers.insert("sec-ch-ua-platform", HeaderValue::from_static(r#""macOS""#));

    Client::builder()
        .default_headers(headers)
        .timeout(navigation_timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Picks one of [`USER_AGENTS`] uniformly at random
pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Renders pages with plain HTTP GET requests
pub struct HttpRenderer {
    client: Client,
    referer: String,
}

impl HttpRenderer {
    /// Creates a renderer whose requests present `origin` as the referer
    pub fn new(origin: &Url, navigation_timeout: Duration) -> Result<Self, RippleError> {
        let client = build_http_client(navigation_timeout).map_err(|source| RippleError::Http {
            url: origin.to_string(),
            source,
        })?;

        Ok(Self {
            client,
            referer: origin.join("/")?.to_string(),
        })
    }
}

impl Renderer for HttpRenderer {
    /// A plain fetch has no background activity, so the page is quiescent
    /// as soon as the body is read.
    async fn render(&self, url: &Url, _settle_timeout: Duration) -> Result<RenderedPage, RippleError> {
        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, random_user_agent())
            .header(REFERER, self.referer.as_str())
            .send()
            .await
            .map_err(|e| classify_transport_error(url, e))?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(RippleError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| classify_transport_error(url, e))?;

        Ok(RenderedPage {
            final_url,
            status: status.as_u16(),
            html,
            settle: Settle::Quiescent,
        })
    }
}

fn classify_transport_error(url: &Url, error: reqwest::Error) -> RippleError {
    if error.is_timeout() {
        RippleError::Timeout {
            url: url.to_string(),
        }
    } else {
        RippleError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
