use async_trait::async_trait;

use crate::error::ScrapeError;

/// Common trait for page fetch strategies (plain HTTP, rendered browser).
/// The category scraper only ever sees this interface, so strategies stay
/// interchangeable per run.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the raw markup of one result page of a category.
    async fn fetch_page(&self, base_url: &str, page: u32) -> Result<String, ScrapeError>;

    /// Get the name of the fetch strategy, for logs.
    fn strategy_name(&self) -> &'static str;
}

/// Page URLs follow CoinAfrique's `?page=N` pagination scheme.
pub fn page_url(base_url: &str, page: u32) -> String {
    format!("{base_url}?page={page}")
}
