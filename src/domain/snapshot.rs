// src/domain/snapshot.rs

use chrono::{Local, NaiveDateTime};

use crate::domain::fingerprint::fingerprint;

/// Stored in place of any value the page did not provide.
/// It is hashed like any other value.
pub const NULL_SENTINEL: &str = "NULL";

/// Format of `observed_at` in logs, mails and the `LastUpdated` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Raw values pulled off the page, before normalization.
/// `None` means the element was absent or had no usable text.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ListingFields {
    pub address: Option<String>,
    pub price: Option<String>,
    pub zipcode: Option<String>,
    pub url: Option<String>,
    pub surface_area: Option<String>,
}

impl ListingFields {
    fn missing_count(&self) -> usize {
        [
            &self.address,
            &self.price,
            &self.zipcode,
            &self.url,
            &self.surface_area,
        ]
        .iter()
        .filter(|v| v.is_none())
        .count()
    }
}

/// One observation of the newest listing on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingSnapshot {
    pub address: String,
    pub price: String,
    pub zipcode: String,
    pub surface_area: String,
    pub url: String,
    pub fingerprint: String,
    pub observed_at: NaiveDateTime,
    /// Every scraped field was missing; usually means the site blocked us.
    pub is_fully_missing: bool,
}

impl ListingSnapshot {
    /// Normalizes missing values to `NULL` and computes the fingerprint.
    pub fn from_fields(fields: ListingFields, observed_at: NaiveDateTime) -> Self {
        let is_fully_missing = fields.missing_count() == 5;
        let or_null = |v: Option<String>| v.unwrap_or_else(|| NULL_SENTINEL.to_string());

        let address = or_null(fields.address);
        let price = or_null(fields.price);
        let zipcode = or_null(fields.zipcode);
        let surface_area = or_null(fields.surface_area);
        let url = or_null(fields.url);

        let fingerprint = fingerprint(&price, &address, &zipcode, &surface_area);

        Self {
            address,
            price,
            zipcode,
            surface_area,
            url,
            fingerprint,
            // Second precision, matching what gets stored.
            observed_at: truncate_to_seconds(observed_at),
            is_fully_missing,
        }
    }

    /// Snapshot stamped with the current local time.
    pub fn observe(fields: ListingFields) -> Self {
        Self::from_fields(fields, Local::now().naive_local())
    }

    pub fn observed_at_display(&self) -> String {
        self.observed_at.format(TIMESTAMP_FORMAT).to_string()
    }
}

fn truncate_to_seconds(ts: NaiveDateTime) -> NaiveDateTime {
    use chrono::Timelike;
    ts.with_nanosecond(0).unwrap_or(ts)
}

/// A snapshot as read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedRow {
    pub id: i64,
    pub price: String,
    pub address: String,
    pub zipcode: String,
    pub surface_area: String,
    pub url: String,
    pub fingerprint: String,
    pub last_updated: Option<NaiveDateTime>,
}
