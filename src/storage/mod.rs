//! SQLite persistence for scraped listings.
//!
//! One flat table, append-only during a run; the only other operations are
//! the idempotent create, a full clear, and a full read for the dashboard.

use anyhow::Result;
use serde::Serialize;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{FromRow, SqlitePool};
use std::path::Path;

use crate::error::ScrapeError;
use crate::models::Listing;

/// A listing row as persisted, with its auto-assigned id. Consumed by the
/// analytics layer via a full-table read.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StoredListing {
    pub id: i64,
    pub category: String,
    pub name: String,
    pub price: Option<f64>,
    pub address: String,
    pub image_url: String,
}

pub struct ListingStore {
    pool: SqlitePool,
}

impl ListingStore {
    /// Open (and create if absent) the database at `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let db_path = database_url
            .trim_start_matches("sqlite://")
            .trim_start_matches("sqlite:");

        if !Path::new(db_path).exists() {
            if let Some(parent) = Path::new(db_path).parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
            std::fs::File::create(db_path)?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create the listings table if it does not exist yet. Safe to call on
    /// every startup.
    pub async fn init(&self) -> Result<()> {
        let create_sql = r#"
            CREATE TABLE IF NOT EXISTS listings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                category TEXT NOT NULL,
                name TEXT NOT NULL,
                price REAL,
                address TEXT NOT NULL,
                image_url TEXT NOT NULL
            )
        "#;

        sqlx::query(create_sql).execute(&self.pool).await?;
        Ok(())
    }

    /// Delete every row. Used when a run asks for a fresh table.
    pub async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM listings").execute(&self.pool).await?;
        Ok(())
    }

    /// Insert one listing; the id is auto-assigned.
    pub async fn append(&self, listing: &Listing) -> Result<i64, ScrapeError> {
        let result = sqlx::query(
            "INSERT INTO listings (category, name, price, address, image_url) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&listing.category)
        .bind(&listing.title)
        .bind(listing.price)
        .bind(&listing.location)
        .bind(&listing.image_url)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Full-table read, in insertion order.
    pub async fn fetch_all(&self) -> Result<Vec<StoredListing>> {
        let rows = sqlx::query_as::<_, StoredListing>(
            "SELECT id, category, name, price, address, image_url FROM listings ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExtractedListing;
    use tempfile::tempdir;

    async fn temp_store() -> Result<(tempfile::TempDir, ListingStore)> {
        let dir = tempdir()?;
        let db_path = dir.path().join("test.db");
        let store = ListingStore::connect(&format!("sqlite:{}", db_path.display())).await?;
        store.init().await?;
        Ok((dir, store))
    }

    fn sample_listing(price_text: &str) -> Listing {
        Listing::from_extracted(
            "Chiens",
            ExtractedListing {
                title: Some("Caniche".to_string()),
                location: Some("Dakar".to_string()),
                price_text: Some(price_text.to_string()),
                image_url: Some("https://sn.coinafrique.com/img.jpg".to_string()),
            },
        )
    }

    #[tokio::test]
    async fn init_is_idempotent_and_clear_empties_the_table() -> Result<()> {
        let (_dir, store) = temp_store().await?;
        store.init().await?;

        store.append(&sample_listing("10 000")).await?;
        assert_eq!(store.fetch_all().await?.len(), 1);

        store.clear().await?;
        store.init().await?;
        assert!(store.fetch_all().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn appended_rows_come_back_in_order_with_ids() -> Result<()> {
        let (_dir, store) = temp_store().await?;

        let first = store.append(&sample_listing("10 000")).await?;
        let second = store.append(&sample_listing("Prix sur demande")).await?;
        assert!(second > first);

        let rows = store.fetch_all().await?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Caniche");
        assert_eq!(rows[0].price, Some(10_000.0));
        // Unknown prices persist as NULL, never NaN.
        assert_eq!(rows[1].price, None);
        assert_eq!(rows[1].address, "Dakar");
        Ok(())
    }
}
