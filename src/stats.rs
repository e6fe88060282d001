//! Aggregates over the persisted listings, as consumed by the dashboard:
//! counts by category, mean price by category, address frequency ranking
//! and a price distribution histogram.

use std::collections::HashMap;

use crate::storage::StoredListing;

/// How many addresses the frequency ranking keeps.
const TOP_ADDRESSES: usize = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct StatsSummary {
    pub total_listings: usize,
    /// (category, listing count), most listings first.
    pub category_counts: Vec<(String, usize)>,
    /// (category, mean price) over rows with a known price.
    pub mean_price_by_category: Vec<(String, f64)>,
    /// (address, listing count), most frequent first, capped at seven.
    pub top_addresses: Vec<(String, usize)>,
    /// Distribution of known prices.
    pub price_histogram: Vec<HistogramBin>,
}

/// Compute the dashboard aggregates from a full table read. Rows without a
/// known price only contribute to the counts.
pub fn summarize(rows: &[StoredListing], bins: usize) -> StatsSummary {
    let mut by_category: HashMap<&str, usize> = HashMap::new();
    let mut price_sums: HashMap<&str, (f64, usize)> = HashMap::new();
    let mut by_address: HashMap<&str, usize> = HashMap::new();
    let mut prices: Vec<f64> = Vec::new();

    for row in rows {
        *by_category.entry(&row.category).or_default() += 1;
        *by_address.entry(&row.address).or_default() += 1;
        if let Some(price) = row.price {
            let entry = price_sums.entry(&row.category).or_insert((0.0, 0));
            entry.0 += price;
            entry.1 += 1;
            prices.push(price);
        }
    }

    let mut category_counts: Vec<(String, usize)> = by_category
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    category_counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut mean_price_by_category: Vec<(String, f64)> = price_sums
        .into_iter()
        .map(|(k, (sum, n))| (k.to_string(), sum / n as f64))
        .collect();
    mean_price_by_category.sort_by(|a, b| a.0.cmp(&b.0));

    let mut top_addresses: Vec<(String, usize)> = by_address
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    top_addresses.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    top_addresses.truncate(TOP_ADDRESSES);

    StatsSummary {
        total_listings: rows.len(),
        category_counts,
        mean_price_by_category,
        top_addresses,
        price_histogram: histogram(&prices, bins),
    }
}

fn histogram(prices: &[f64], bins: usize) -> Vec<HistogramBin> {
    if prices.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    // All prices identical: a single bin holds everything.
    if (max - min).abs() < f64::EPSILON {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: prices.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &p in prices {
        let idx = (((p - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: min + width * (i + 1) as f64,
            count,
        })
        .collect()
}
