//! Headless Chromium rendering
//!
//! Each request gets its own tab in one shared browser. The tab is masked as
//! a regular desktop browser before navigating, and the document is captured
//! once the network goes idle or the settle timeout runs out.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{random_user_agent, settle_within, RenderedPage, Renderer};
use crate::RippleError;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent, EventResponseReceived,
    ResourceType, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::page::{
    AddScriptToEvaluateOnNewDocumentParams, NavigateParams,
};
use chromiumoxide::listeners::EventStream;
use chromiumoxide::Page;
use futures::StreamExt;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

/// Hides the automation flag from page scripts
const WEBDRIVER_OVERRIDE: &str =
    "Object.defineProperty(navigator, 'webdriver', { get: () => undefined });";

/// How long the network must stay quiet to count as idle
const IDLE_QUIET_PERIOD: Duration = Duration::from_millis(500);

const BROWSER_CANDIDATES: [&str; 4] = ["chromium", "chromium-browser", "google-chrome", "chrome"];

/// Locates the browser executable
///
/// An explicitly configured path must exist. Otherwise `CHROMIUM_PATH` is
/// tried, then the usual executable names on `PATH`.
pub fn find_browser_executable(explicit: Option<&str>) -> Result<PathBuf, RippleError> {
    if let Some(path) = explicit {
        let path = PathBuf::from(path);
        if path.exists() {
            return Ok(path);
        }
        return Err(RippleError::BrowserLaunch(format!(
            "configured chrome-path {} does not exist",
            path.display()
        )));
    }

    if let Ok(path) = std::env::var("CHROMIUM_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Ok(path);
        }
    }

    BROWSER_CANDIDATES
        .iter()
        .find_map(|name| which::which(name).ok())
        .ok_or_else(|| {
            RippleError::BrowserLaunch(
                "no Chromium or Chrome executable found; set crawler.chrome-path".to_string(),
            )
        })
}

/// Renders pages in a Chromium instance driven over the DevTools protocol
pub struct ChromiumRenderer {
    browser: Browser,
    handler: JoinHandle<()>,
    referer: String,
    navigation_timeout: Duration,
}

impl ChromiumRenderer {
    /// Launches the browser
    ///
    /// # Arguments
    ///
    /// * `origin` - Site origin, sent as the referer of every navigation
    /// * `crawler` - Supplies the executable, window mode and navigation timeout
    ///
    /// # Returns
    ///
    /// * `Ok(ChromiumRenderer)` - The browser is running
    /// * `Err(RippleError::BrowserLaunch)` - No executable, or the browser failed to start
    pub async fn launch(origin: &Url, crawler: &CrawlerConfig) -> Result<Self, RippleError> {
        let executable = find_browser_executable(crawler.chrome_path.as_deref())?;
        tracing::debug!(path = %executable.display(), "Using browser executable");

        let mut builder = BrowserConfig::builder()
            .chrome_executable(executable)
            .request_timeout(crawler.navigation_timeout())
            .window_size(1920, 1080)
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage");
        if !crawler.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(RippleError::BrowserLaunch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RippleError::BrowserLaunch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser connection error: {}", e);
                }
            }
        });

        tracing::info!(headless = crawler.headless, "Browser launched");

        Ok(Self {
            browser,
            handler,
            referer: origin.join("/")?.to_string(),
            navigation_timeout: crawler.navigation_timeout(),
        })
    }

    /// Opens a blank tab with the automation markers masked
    async fn open_page(&self, url: &Url) -> Result<Page, RippleError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| browser_error(url, e))?;

        page.execute(AddScriptToEvaluateOnNewDocumentParams {
            source: WEBDRIVER_OVERRIDE.to_string(),
            include_command_line_api: None,
            world_name: None,
            run_immediately: None,
        })
        .await
        .map_err(|e| browser_error(url, e))?;

        page.execute(SetUserAgentOverrideParams {
            user_agent: random_user_agent().to_string(),
            accept_language: Some("en-US,en;q=0.9".to_string()),
            platform: Some("MacIntel".to_string()),
            user_agent_metadata: None,
        })
        .await
        .map_err(|e| browser_error(url, e))?;

        Ok(page)
    }

    async fn capture(
        &self,
        page: &Page,
        url: &Url,
        settle_timeout: Duration,
    ) -> Result<RenderedPage, RippleError> {
        // Listeners go in before navigating so no request is missed
        let mut traffic = NetworkTraffic::listen(page)
            .await
            .map_err(|e| browser_error(url, e))?;

        let navigate = NavigateParams::builder()
            .url(url.as_str())
            .referrer(self.referer.clone())
            .build()
            .map_err(|message| RippleError::Browser {
                url: url.to_string(),
                message,
            })?;

        match tokio::time::timeout(self.navigation_timeout, page.goto(navigate)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(browser_error(url, e)),
            Err(_) => {
                return Err(RippleError::Timeout {
                    url: url.to_string(),
                })
            }
        }

        let settle = settle_within(settle_timeout, traffic.wait_for_idle()).await;

        let status = traffic.document_status.unwrap_or(200);
        if !(200..300).contains(&status) {
            return Err(RippleError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        let html: String = page
            .evaluate("document.documentElement.outerHTML")
            .await
            .map_err(|e| browser_error(url, e))?
            .into_value()
            .map_err(|e| RippleError::Browser {
                url: url.to_string(),
                message: format!("unreadable document: {e:?}"),
            })?;

        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .and_then(|current| Url::parse(&current).ok())
            .unwrap_or_else(|| url.clone());

        Ok(RenderedPage {
            final_url,
            status,
            html,
            settle,
        })
    }
}

impl Renderer for ChromiumRenderer {
    async fn render(&self, url: &Url, settle_timeout: Duration) -> Result<RenderedPage, RippleError> {
        let page = self.open_page(url).await?;
        let rendered = self.capture(&page, url, settle_timeout).await;

        if let Err(e) = page.close().await {
            tracing::debug!(url = %url, "Failed to close tab: {}", e);
        }

        rendered
    }
}

impl Drop for ChromiumRenderer {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// Network events of one tab, tracked until the tab goes quiet
struct NetworkTraffic {
    sent: EventStream<EventRequestWillBeSent>,
    finished: EventStream<EventLoadingFinished>,
    failed: EventStream<EventLoadingFailed>,
    responses: EventStream<EventResponseReceived>,
    in_flight: HashSet<String>,
    /// Status of the first document response, the page itself
    document_status: Option<u16>,
}

impl NetworkTraffic {
    async fn listen(page: &Page) -> Result<Self, chromiumoxide::error::CdpError> {
        Ok(Self {
            sent: page.event_listener::<EventRequestWillBeSent>().await?,
            finished: page.event_listener::<EventLoadingFinished>().await?,
            failed: page.event_listener::<EventLoadingFailed>().await?,
            responses: page.event_listener::<EventResponseReceived>().await?,
            in_flight: HashSet::new(),
            document_status: None,
        })
    }

    /// Resolves once no request has been in flight for [`IDLE_QUIET_PERIOD`]
    async fn wait_for_idle(&mut self) {
        loop {
            tokio::select! {
                Some(event) = self.sent.next() => {
                    self.in_flight.insert(event.request_id.inner().clone());
                }
                Some(event) = self.finished.next() => {
                    self.in_flight.remove(event.request_id.inner());
                }
                Some(event) = self.failed.next() => {
                    self.in_flight.remove(event.request_id.inner());
                }
                Some(event) = self.responses.next() => {
                    if event.r#type == ResourceType::Document && self.document_status.is_none() {
                        self.document_status = u16::try_from(event.response.status).ok();
                    }
                }
                _ = tokio::time::sleep(IDLE_QUIET_PERIOD), if self.in_flight.is_empty() => return,
                else => return,
            }
        }
    }
}

fn browser_error(url: &Url, error: chromiumoxide::error::CdpError) -> RippleError {
    RippleError::Browser {
        url: url.to_string(),
        message: error.to_string(),
    }
}
