use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::ScrapeError;
use crate::scrapers::traits::{page_url, PageFetcher};

/// How long to let client-side rendering settle after navigation.
const SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Rendered fetch strategy: drives one headless Chrome instance for the
/// whole category run and reads the DOM after scripts have run. Slower to
/// start than [`HttpFetcher`](crate::scrapers::HttpFetcher) but handles
/// client-side-rendered listings.
///
/// The browser process is released when the fetcher is dropped, on every
/// exit path of the run.
pub struct BrowserFetcher {
    // Keeps the Chrome process alive for the lifetime of the fetcher.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl BrowserFetcher {
    /// Launch headless Chrome. A launch failure here is fatal to the run —
    /// there is no page-level recovery without a browser.
    pub fn new() -> Result<Self, ScrapeError> {
        info!("Launching headless Chrome...");
        Self::launch().map_err(|e| ScrapeError::BrowserLaunch(e.into()))
    }

    fn launch() -> Result<Self> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options)
            .context("Failed to launch Chrome browser")?;

        let tab = browser.new_tab().context("Failed to open browser tab")?;

        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    fn navigate(&self, url: &str) -> Result<()> {
        self.tab.navigate_to(url)?;
        self.tab.wait_until_navigated()?;
        Ok(())
    }

    fn read_dom(&self) -> Result<String> {
        let result = self.tab.evaluate("document.documentElement.outerHTML", false)?;
        let html = result
            .value
            .and_then(|v| v.as_str().map(str::to_string))
            .ok_or_else(|| anyhow!("page returned no HTML"))?;

        debug!("Rendered {} bytes of HTML", html.len());
        Ok(html)
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch_page(&self, base_url: &str, page: u32) -> Result<String, ScrapeError> {
        let url = page_url(base_url, page);
        debug!("Rendering URL: {}", url);

        self.navigate(&url).map_err(|e| ScrapeError::fetch(&url, e))?;

        // Let client-side rendering finish before reading the DOM.
        tokio::time::sleep(SETTLE_DELAY).await;

        self.read_dom().map_err(|e| ScrapeError::fetch(&url, e))
    }

    fn strategy_name(&self) -> &'static str {
        "browser"
    }
}
