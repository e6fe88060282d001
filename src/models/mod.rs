use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::price::normalize_price;

/// Sentinel stored for fields the extractor could not find.
pub const MISSING: &str = "N/A";

/// Raw fields pulled out of one listing card, before any cleanup.
/// `None` means the sub-element was absent from the markup — extraction
/// never fails a listing over one missing field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedListing {
    pub title: Option<String>,
    pub location: Option<String>,
    pub price_text: Option<String>,
    pub image_url: Option<String>,
}

/// One classified-ad listing, ready for display and persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    /// Category label supplied by the caller, never parsed from the page.
    pub category: String,
    pub title: String,
    /// Price text exactly as scraped ("1 500 000 CFA", "Prix sur demande", ...).
    pub price_raw: String,
    /// Normalized numeric price; `None` when the raw text is unparseable.
    pub price: Option<f64>,
    pub location: String,
    pub image_url: String,
    pub scraped_at: DateTime<Utc>,
}

impl Listing {
    /// Materialize a listing from raw extracted fields: absent fields become
    /// the "N/A" sentinel and the price text is normalized to a number.
    pub fn from_extracted(category: &str, raw: ExtractedListing) -> Self {
        let price_raw = raw.price_text.unwrap_or_else(|| MISSING.to_string());
        let price = normalize_price(&price_raw);

        Self {
            category: category.to_string(),
            title: raw.title.unwrap_or_else(|| MISSING.to_string()),
            price_raw,
            price,
            location: raw.location.unwrap_or_else(|| MISSING.to_string()),
            image_url: raw.image_url.unwrap_or_else(|| MISSING.to_string()),
            scraped_at: Utc::now(),
        }
    }
}

/// A page whose fetch failed during a category run. Recorded and reported,
/// never fatal to the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFailure {
    pub page: u32,
    pub url: String,
    pub error: String,
}

/// Result of one category run: listings in page order then card order,
/// plus the pages that could not be fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeOutcome {
    pub category: String,
    pub listings: Vec<Listing>,
    pub failures: Vec<PageFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_become_sentinels() {
        let listing = Listing::from_extracted("Chiens", ExtractedListing::default());
        assert_eq!(listing.title, "N/A");
        assert_eq!(listing.location, "N/A");
        assert_eq!(listing.price_raw, "N/A");
        assert_eq!(listing.image_url, "N/A");
        assert_eq!(listing.price, None);
        assert_eq!(listing.category, "Chiens");
    }

    #[test]
    fn price_text_is_normalized_on_materialization() {
        let raw = ExtractedListing {
            title: Some("Berger allemand".to_string()),
            location: Some("Dakar".to_string()),
            price_text: Some("150 000 CFA".to_string()),
            image_url: Some("https://sn.coinafrique.com/img/1.jpg".to_string()),
        };
        let listing = Listing::from_extracted("Chiens", raw);
        assert_eq!(listing.price, Some(150_000.0));
        assert_eq!(listing.price_raw, "150 000 CFA");
    }
}
