pub mod browser;
pub mod category;
pub mod extract;
pub mod http;
pub mod traits;

pub use browser::BrowserFetcher;
pub use category::{CategoryScraper, RunOptions};
pub use http::HttpFetcher;
pub use traits::PageFetcher;
