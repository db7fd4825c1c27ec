// fetcher.rs
use reqwest::blocking::Client;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::scraper::ScraperError;

/// Anything that can hand back the markup of the watched page.
pub trait PageSource {
    fn fetch(&self) -> Result<String, ScraperError>;
}

/// Plain blocking GET of one configured URL.
pub struct HttpFetcher {
    client: Client,
    url: String,
}

impl HttpFetcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl PageSource for HttpFetcher {
    fn fetch(&self) -> Result<String, ScraperError> {
        let start = Instant::now();

        let resp = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScraperError::HttpStatus {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let text = resp
            .text()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        debug!(
            url = %self.url,
            bytes = text.len(),
            elapsed = ?start.elapsed(),
            "fetched listing page"
        );
        Ok(text)
    }
}
