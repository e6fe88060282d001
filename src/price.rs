//! Price text cleanup for CoinAfrique listings.
//!
//! Prices arrive as free text: `"1 500 000 CFA"`, `"12,000"`, `"Prix sur
//! demande"`, with non-breaking spaces and inconsistent thousands separators.
//! Normalization is total — bad input yields `None`, never an error.

use crate::models::Listing;

/// Marker phrases for listings whose price is negotiated off-site.
const ON_REQUEST_MARKERS: [&str; 2] = ["Prix sur demande", "Sur demande"];

/// Clean a raw price string into a numeric value.
///
/// Returns `None` for empty input, "price on request" text, or anything that
/// does not survive separator stripping as a parseable non-negative number.
pub fn normalize_price(raw: &str) -> Option<f64> {
    let val = raw.trim();
    if val.is_empty() {
        return None;
    }
    if ON_REQUEST_MARKERS.iter().any(|m| val.contains(m)) {
        return None;
    }

    // Spaces (breaking or not) and commas are thousands separators here.
    let val = val.replace('\u{00A0}', " ").replace([' ', ','], "");

    let digits: String = val.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    if digits.is_empty() {
        return None;
    }

    let cleaned = strip_dot_grouping(&digits);
    match cleaned.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => Some(n),
        _ => None,
    }
}

/// Distinguish `12.000` (thousands-grouped, common in local listings) from a
/// genuine decimal point: when every dot-separated group after the first has
/// exactly three digits, the dots are separators and get stripped.
fn strip_dot_grouping(s: &str) -> String {
    let groups: Vec<&str> = s.split('.').collect();
    if groups.len() >= 2
        && !groups[0].is_empty()
        && groups[1..].iter().all(|g| g.len() == 3)
    {
        groups.concat()
    } else {
        s.to_string()
    }
}

/// Median of a set of prices; `None` when the set is empty. Even-sized sets
/// average the two middle values.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Backfill unknown prices with the median of the run's parsed prices.
/// Leaves everything untouched when no listing has a parseable price.
pub fn impute_missing_prices(listings: &mut [Listing]) {
    let known: Vec<f64> = listings.iter().filter_map(|l| l.price).collect();
    if let Some(med) = median(&known) {
        for listing in listings.iter_mut() {
            if listing.price.is_none() {
                listing.price = Some(med);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExtractedListing;

    fn listing_with_price(price_text: &str) -> Listing {
        Listing::from_extracted(
            "Moutons",
            ExtractedListing {
                price_text: Some(price_text.to_string()),
                ..Default::default()
            },
        )
    }

    #[test]
    fn on_request_markers_are_unknown() {
        assert_eq!(normalize_price("Prix sur demande"), None);
        assert_eq!(normalize_price("Sur demande"), None);
        assert_eq!(normalize_price("  Prix sur demande  "), None);
    }

    #[test]
    fn empty_and_non_numeric_are_unknown() {
        assert_eq!(normalize_price(""), None);
        assert_eq!(normalize_price("   "), None);
        assert_eq!(normalize_price("N/A"), None);
        assert_eq!(normalize_price("Gratuit"), None);
    }

    #[test]
    fn thousands_separators_are_stripped() {
        assert_eq!(normalize_price("12 000"), Some(12_000.0));
        assert_eq!(normalize_price("12,000"), Some(12_000.0));
        assert_eq!(normalize_price("12.000"), Some(12_000.0));
        assert_eq!(normalize_price("1.234.567"), Some(1_234_567.0));
    }

    #[test]
    fn non_breaking_spaces_and_currency_words_are_ignored() {
        assert_eq!(normalize_price("1\u{00A0}500\u{00A0}000 CFA"), Some(1_500_000.0));
        assert_eq!(normalize_price("150 000 FCFA"), Some(150_000.0));
    }

    #[test]
    fn genuine_decimals_survive() {
        assert_eq!(normalize_price("1234.5"), Some(1234.5));
        assert_eq!(normalize_price("0.99"), Some(0.99));
    }

    #[test]
    fn median_of_even_and_odd_sets() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[5.0]), Some(5.0));
        assert_eq!(median(&[1000.0, 3000.0]), Some(2000.0));
        assert_eq!(median(&[3000.0, 1000.0, 2000.0]), Some(2000.0));
    }

    #[test]
    fn imputation_backfills_unknowns_with_median() {
        let mut listings = vec![
            listing_with_price("1 000"),
            listing_with_price("Prix sur demande"),
            listing_with_price("3 000"),
        ];
        impute_missing_prices(&mut listings);
        assert_eq!(listings[1].price, Some(2000.0));
        assert_eq!(listings[0].price, Some(1000.0));
        assert_eq!(listings[2].price, Some(3000.0));
    }

    #[test]
    fn imputation_is_a_noop_without_any_parsed_price() {
        let mut listings = vec![
            listing_with_price("Prix sur demande"),
            listing_with_price("Sur demande"),
        ];
        impute_missing_prices(&mut listings);
        assert!(listings.iter().all(|l| l.price.is_none()));
    }
}
