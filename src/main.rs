mod error;
mod models;
mod price;
mod scrapers;
mod stats;
mod storage;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use models::ScrapeOutcome;
use scrapers::{BrowserFetcher, CategoryScraper, HttpFetcher, PageFetcher, RunOptions};
use storage::ListingStore;

/// The CoinAfrique animal categories scraped by default.
const DEFAULT_CATEGORIES: [(&str, &str); 4] = [
    ("Chiens", "https://sn.coinafrique.com/categorie/chiens"),
    ("Moutons", "https://sn.coinafrique.com/categorie/moutons"),
    (
        "Poules / Lapins / Pigeons",
        "https://sn.coinafrique.com/categorie/poules-lapins-et-pigeons",
    ),
    ("Autres animaux", "https://sn.coinafrique.com/categorie/autres-animaux"),
];

const PRICE_HISTOGRAM_BINS: usize = 10;

#[derive(Parser)]
#[command(author, version, about = "CoinAfrique animal-listings scraper")]
struct Args {
    /// Path to the SQLite database file
    #[arg(long, default_value = "database/animals.db", global = true)]
    db: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape one or more categories and persist the listings
    Scrape {
        /// Pages to fetch per category
        #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..=100))]
        pages: u32,

        /// Fetch strategy
        #[arg(short, long, value_enum, default_value_t = Engine::Http)]
        engine: Engine,

        /// Clear the listings table before scraping
        #[arg(long)]
        reset: bool,

        /// Leave unparseable prices unknown instead of backfilling the median
        #[arg(long)]
        no_impute: bool,

        /// Category to scrape as LABEL=URL; repeatable. Defaults to the four
        /// CoinAfrique animal categories.
        #[arg(short, long = "category", value_parser = parse_category)]
        categories: Vec<(String, String)>,

        /// Also write the scraped listings to a JSON file
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Print aggregate statistics over the persisted listings
    Stats,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Engine {
    /// Single HTTP GET per page; fast, needs server-rendered markup
    Http,
    /// Headless Chrome; handles client-side-rendered pages
    Browser,
}

fn parse_category(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((label, url)) if !label.is_empty() && !url.is_empty() => {
            Ok((label.to_string(), url.to_string()))
        }
        _ => Err(format!("expected LABEL=URL, got '{s}'")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let store = ListingStore::connect(&format!("sqlite:{}", args.db)).await?;
    store.init().await?;

    match args.command {
        Command::Scrape {
            pages,
            engine,
            reset,
            no_impute,
            categories,
            output,
        } => {
            let categories = if categories.is_empty() {
                DEFAULT_CATEGORIES
                    .iter()
                    .map(|(l, u)| (l.to_string(), u.to_string()))
                    .collect()
            } else {
                categories
            };

            run_scrape(&store, engine, pages, reset, !no_impute, &categories, output).await
        }
        Command::Stats => run_stats(&store).await,
    }
}

async fn run_scrape(
    store: &ListingStore,
    engine: Engine,
    pages: u32,
    reset: bool,
    impute_missing: bool,
    categories: &[(String, String)],
    output: Option<String>,
) -> Result<()> {
    info!("🐾 Animal Scout - CoinAfrique listings scraper");

    // A browser launch failure is fatal: there is no run without a fetcher.
    let fetcher: Box<dyn PageFetcher> = match engine {
        Engine::Http => Box::new(HttpFetcher::new()?),
        Engine::Browser => Box::new(BrowserFetcher::new()?),
    };

    // One clear for the whole run; each category then appends.
    if reset {
        info!("Clearing listings table");
        store.clear().await?;
    }

    let scraper = CategoryScraper::new(fetcher.as_ref(), store);
    let options = RunOptions {
        max_pages: pages,
        impute_missing,
        reset_before_run: false,
    };

    let mut outcomes: Vec<ScrapeOutcome> = Vec::new();
    let total = categories.len();
    for (i, (label, url)) in categories.iter().enumerate() {
        let outcome = scraper.scrape(label, url, &options).await?;
        info!("[{}/{}] {} done", i + 1, total, label);
        outcomes.push(outcome);
    }

    display_outcomes(&outcomes);

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&outcomes)?;
        tokio::fs::write(&path, json).await?;
        info!("💾 Saved scraped listings to {}", path);
    }

    Ok(())
}

fn display_outcomes(outcomes: &[ScrapeOutcome]) {
    for outcome in outcomes {
        println!("\n=== {} ({} listings) ===", outcome.category, outcome.listings.len());

        if outcome.listings.is_empty() {
            println!("No listings found for this category.");
        }

        for (i, listing) in outcome.listings.iter().enumerate() {
            let price = listing
                .price
                .map(|p| format!("{p:.0} FCFA"))
                .unwrap_or_else(|| "price unknown".to_string());
            println!("{}. {} ({})", i + 1, listing.title, price);
            println!("   {} — {}", listing.location, listing.image_url);
        }

        for failure in &outcome.failures {
            warn!(
                "Page {} of '{}' was skipped: {}",
                failure.page, outcome.category, failure.error
            );
        }
    }
}

async fn run_stats(store: &ListingStore) -> Result<()> {
    let rows = store.fetch_all().await?;
    let summary = stats::summarize(&rows, PRICE_HISTOGRAM_BINS);

    println!("📦 Total listings: {}", summary.total_listings);

    println!("\n📊 Listings per category:");
    for (category, count) in &summary.category_counts {
        println!("  {category}: {count}");
    }

    println!("\n💰 Mean price per category (FCFA):");
    for (category, mean) in &summary.mean_price_by_category {
        println!("  {category}: {mean:.0}");
    }

    println!("\n🏆 Top addresses:");
    for (i, (address, count)) in summary.top_addresses.iter().enumerate() {
        println!("  {}. {} ({})", i + 1, address, count);
    }

    if !summary.price_histogram.is_empty() {
        println!("\n📉 Price distribution:");
        for bin in &summary.price_histogram {
            println!("  {:>12.0} - {:>12.0}: {}", bin.lower, bin.upper, bin.count);
        }
    }

    Ok(())
}
