// src/monitor/mod.rs
mod scheduler;

pub use scheduler::{Scheduler, StopHandle};

use tracing::{error, info, warn};

use crate::db::{snapshots, Database};
use crate::domain::ListingSnapshot;
use crate::errors::WatchResult;
use crate::mailer::Notifier;
use crate::scraper::{ListingExtractor, PageSource};

/// What one poll did.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Store was empty; the snapshot became the first row.
    FirstRecord { row_id: i64 },
    /// Fingerprint matches the newest row.
    Unchanged,
    /// New fingerprint: row appended, mail attempted.
    Changed { row_id: i64, notified: bool },
    /// Fetch or parse failed; nothing stored.
    Skipped,
}

/// fetch -> extract -> compare -> persist -> notify, once per call.
pub struct Monitor<S, N> {
    source: S,
    extractor: ListingExtractor,
    notifier: N,
    db: Database,
}

impl<S: PageSource, N: Notifier> Monitor<S, N> {
    pub fn new(source: S, extractor: ListingExtractor, notifier: N, db: Database) -> Self {
        Self {
            source,
            extractor,
            notifier,
            db,
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Poll on the scheduler until a store error or a stop.
    pub fn run(&self, scheduler: &Scheduler) -> WatchResult<u64> {
        scheduler.run(|| self.poll_once().map(|_| ()))
    }

    /// One full iteration minus the sleep.
    ///
    /// Only store failures come back as `Err`; fetch, parse and mail
    /// failures are logged and the poll still counts.
    pub fn poll_once(&self) -> WatchResult<PollOutcome> {
        let snapshot = match self.observe() {
            Ok(snapshot) => snapshot,
            Err(e) if !e.is_fatal() => {
                warn!(error = %e, "poll skipped");
                return Ok(PollOutcome::Skipped);
            }
            Err(e) => return Err(e),
        };

        let previous = self.db.with_conn(snapshots::latest_fingerprint)?;

        match previous {
            None => {
                let row_id = self.append(&snapshot)?;
                info!(row_id, "Inserted new record (previous hash was None)");
                Ok(PollOutcome::FirstRecord { row_id })
            }
            Some(Some(hash)) if hash == snapshot.fingerprint => {
                info!("No update");
                Ok(PollOutcome::Unchanged)
            }
            Some(_) => self.record_change(&snapshot),
        }
    }

    fn observe(&self) -> WatchResult<ListingSnapshot> {
        let html = self.source.fetch()?;
        info!("Received listing page");
        Ok(self.extractor.extract(&html)?)
    }

    fn record_change(&self, snapshot: &ListingSnapshot) -> WatchResult<PollOutcome> {
        if let Some(prev) = self.db.with_conn(snapshots::latest_snapshot)? {
            info!(
                previous_price = %prev.price,
                previous_address = %prev.address,
                "listing changed"
            );
        }

        let notified = match self.notifier.notify(snapshot) {
            Ok(()) => {
                info!("New record, E-Mail sent");
                true
            }
            Err(e) => {
                error!(error = %e, "change notification failed");
                false
            }
        };
        info!(
            "{} - {} - {} - {}",
            snapshot.price, snapshot.address, snapshot.zipcode, snapshot.surface_area
        );

        let row_id = self.append(snapshot)?;
        info!(row_id, "Inserted new record to the database");

        Ok(PollOutcome::Changed { row_id, notified })
    }

    fn append(&self, snapshot: &ListingSnapshot) -> WatchResult<i64> {
        self.db
            .with_conn(|conn| snapshots::append_snapshot(conn, snapshot))
            .map_err(|e| {
                error!(error = %e, fingerprint = %snapshot.fingerprint, "could not persist snapshot");
                e
            })
    }
}
