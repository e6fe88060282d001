use anyhow::Result;
use tracing::{debug, info, warn};

use crate::models::{Listing, PageFailure, ScrapeOutcome};
use crate::price::impute_missing_prices;
use crate::scrapers::extract::extract_listings;
use crate::scrapers::traits::{page_url, PageFetcher};
use crate::storage::ListingStore;

/// Knobs for one category run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Pages to walk, starting at 1.
    pub max_pages: u32,
    /// Backfill unknown prices with the run's median after all pages.
    pub impute_missing: bool,
    /// Clear the whole listings table before this run starts.
    pub reset_before_run: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_pages: 1,
            impute_missing: true,
            reset_before_run: false,
        }
    }
}

/// Walks one category's result pages with whichever fetch strategy it was
/// given, extracts and persists listings as they come, and reports page
/// failures without aborting the run.
pub struct CategoryScraper<'a> {
    fetcher: &'a dyn PageFetcher,
    store: &'a ListingStore,
}

impl<'a> CategoryScraper<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher, store: &'a ListingStore) -> Self {
        Self { fetcher, store }
    }

    /// Scrape pages 1..=max_pages of one category.
    ///
    /// Failed pages are recorded and skipped; pages with no listing cards
    /// end nothing (the next page is still tried); a failed save is logged
    /// and the run moves on. Listings come back in page order, then card
    /// order within the page.
    pub async fn scrape(
        &self,
        category: &str,
        base_url: &str,
        options: &RunOptions,
    ) -> Result<ScrapeOutcome> {
        info!(
            "Scraping '{}' via {} ({} page(s))",
            category,
            self.fetcher.strategy_name(),
            options.max_pages
        );

        if options.reset_before_run {
            info!("Clearing listings table before run");
            self.store.clear().await?;
        }

        let mut listings: Vec<Listing> = Vec::new();
        let mut failures: Vec<PageFailure> = Vec::new();

        for page in 1..=options.max_pages {
            let html = match self.fetcher.fetch_page(base_url, page).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("Page {} of '{}' failed: {}", page, category, e);
                    failures.push(PageFailure {
                        page,
                        url: page_url(base_url, page),
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            let extracted = extract_listings(&html);
            if extracted.is_empty() {
                debug!("Page {} of '{}' has no listings", page, category);
                continue;
            }

            for raw in extracted {
                let listing = Listing::from_extracted(category, raw);

                // Write-through; a failed save is reported, not fatal.
                if let Err(e) = self.store.append(&listing).await {
                    warn!("Failed to save listing '{}': {}", listing.title, e);
                }

                listings.push(listing);
            }
        }

        if options.impute_missing {
            impute_missing_prices(&mut listings);
        }

        info!(
            "'{}' done: {} listing(s), {} failed page(s)",
            category,
            listings.len(),
            failures.len()
        );

        Ok(ScrapeOutcome {
            category: category.to_string(),
            listings,
            failures,
        })
    }
}
