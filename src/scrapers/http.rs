use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::error::ScrapeError;
use crate::scrapers::traits::{page_url, PageFetcher};

/// Lightweight fetch strategy: a single GET per page. Fast, and sufficient
/// when the site renders listings server-side.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, base_url: &str, page: u32) -> Result<String, ScrapeError> {
        let url = page_url(base_url, page);
        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ScrapeError::fetch(&url, e))?
            .error_for_status()
            .map_err(|e| ScrapeError::fetch(&url, e))?;

        let html = response
            .text()
            .await
            .map_err(|e| ScrapeError::fetch(&url, e))?;

        debug!("Downloaded {} bytes of HTML", html.len());
        Ok(html)
    }

    fn strategy_name(&self) -> &'static str {
        "http"
    }
}
