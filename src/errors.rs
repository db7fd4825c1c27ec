// errors.rs
use thiserror::Error;

use crate::mailer::MailerError;
use crate::scraper::ScraperError;

/// Errors surfaced by the watcher, from startup (config, logging)
/// through each step of a poll (fetch, extract, store, notify).
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Database error: {0}")]
    DbError(String),

    #[error(transparent)]
    Scraper(#[from] ScraperError),

    #[error(transparent)]
    Mailer(#[from] MailerError),
}

// Type alias used across the store and loop.
pub type WatchResult<T> = Result<T, WatchError>;

impl WatchError {
    /// Only a broken store stops the loop: every later comparison depends
    /// on durable history. Fetch, parse and mail failures wait for the next poll.
    pub fn is_fatal(&self) -> bool {
        match self {
            WatchError::Config(_) | WatchError::Logging(_) | WatchError::DbError(_) => true,
            WatchError::Scraper(_) | WatchError::Mailer(_) => false,
        }
    }
}

impl From<rusqlite::Error> for WatchError {
    fn from(e: rusqlite::Error) -> Self {
        WatchError::DbError(e.to_string())
    }
}
