use thiserror::Error;

/// Recoverable failure taxonomy for a category run.
///
/// `Fetch` is recoverable at page granularity, `Persistence` at listing
/// granularity; only `BrowserLaunch` aborts a run outright.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request for {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to launch headless browser")]
    BrowserLaunch(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("storage write failed")]
    Persistence(#[from] sqlx::Error),
}

impl ScrapeError {
    pub fn fetch(
        url: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Fetch {
            url: url.into(),
            source: source.into(),
        }
    }
}
