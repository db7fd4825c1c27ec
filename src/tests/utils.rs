use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::db::{snapshots, Database};
use crate::domain::ListingSnapshot;
use crate::mailer::{MailerError, Notifier};
use crate::monitor::Monitor;
use crate::scraper::{ListingExtractor, PageSource, ScraperError, DEFAULT_BASE_URL};

/// Page source that replays queued responses, one per fetch.
#[derive(Clone, Default)]
pub struct ScriptedSource {
    pages: Rc<RefCell<VecDeque<Result<String, ScraperError>>>>,
}

impl ScriptedSource {
    pub fn push_page(&self, html: String) {
        self.pages.borrow_mut().push_back(Ok(html));
    }

    pub fn push_error(&self, err: ScraperError) {
        self.pages.borrow_mut().push_back(Err(err));
    }
}

impl PageSource for ScriptedSource {
    fn fetch(&self) -> Result<String, ScraperError> {
        self.pages
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ScraperError::Network("no page queued".into())))
    }
}

/// Notifier that remembers what it was asked to send.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Rc<RefCell<Vec<ListingSnapshot>>>,
    fail: Rc<RefCell<bool>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<ListingSnapshot> {
        self.sent.borrow().clone()
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.borrow_mut() = fail;
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, snapshot: &ListingSnapshot) -> Result<(), MailerError> {
        if *self.fail.borrow() {
            return Err(MailerError::Transport("535 authentication failed".into()));
        }
        self.sent.borrow_mut().push(snapshot.clone());
        Ok(())
    }
}

/// Overview page whose first card carries the given values.
pub fn listing_page(price: &str, address: &str, zipcode: &str, surface: &str, href: &str) -> String {
    format!(
        r#"<html><body><main>
        <article class="objectcontainer col-12 col-xs-12 col-sm-6 col-md-6 col-lg-4">
          <a class="img-container" href="{href}"><img src="thumb.jpg"></a>
          <span class="street">{address}</span>
          <span class="zipcode">{zipcode}</span>
          <span class="obj_price">€ {price},- per maand</span>
          <span class="object_label object_sqfeet">{surface} m²</span>
        </article>
        </main></body></html>"#
    )
}

/// Monitor over an in-memory store with scripted I/O.
pub fn test_monitor() -> (
    Monitor<ScriptedSource, RecordingNotifier>,
    ScriptedSource,
    RecordingNotifier,
) {
    let db = Database::open_in_memory().unwrap_or_else(|e| panic!("open test DB: {e}"));
    db.with_conn(snapshots::ensure_schema)
        .unwrap_or_else(|e| panic!("Database initialization failed: {e}"));

    let source = ScriptedSource::default();
    let notifier = RecordingNotifier::default();
    let extractor = ListingExtractor::new(DEFAULT_BASE_URL).unwrap();

    let monitor = Monitor::new(source.clone(), extractor, notifier.clone(), db);
    (monitor, source, notifier)
}

pub fn row_count(monitor: &Monitor<ScriptedSource, RecordingNotifier>) -> i64 {
    monitor
        .db()
        .with_conn(snapshots::count_snapshots)
        .unwrap_or_else(|e| panic!("count rows: {e}"))
}
