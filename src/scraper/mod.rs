mod extractor;
mod fetcher;
mod scraper_error;

pub use extractor::{ListingExtractor, DEFAULT_BASE_URL};
pub use fetcher::{HttpFetcher, PageSource};
pub use scraper_error::ScraperError;
