use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("HTML parse error: {0}")]
    HtmlParse(String),

    #[error("Listing container not found (page layout changed?)")]
    MissingListing,

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}
