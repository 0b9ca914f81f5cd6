use crate::progress::{CrawlStatus, ProgressEvent, SessionRegistry};
use std::sync::Arc;

/// Best-effort relay of progress events to a session's sink
///
/// The emitter holds a non-owning reference to the registry. If the
/// session has already been removed (batch finished) or was never
/// registered, emitting is a silent no-op; the emitter neither buffers
/// nor retries.
#[derive(Debug, Clone)]
pub struct ProgressEmitter {
    registry: Arc<SessionRegistry>,
}

impl ProgressEmitter {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Forwards an event to its session's sink, if the session is live
    ///
    /// A closed sink (receiver dropped) is treated the same as a missing
    /// session: the event is discarded without error.
    pub fn emit(&self, event: ProgressEvent) {
        if let Some(sink) = self.registry.sink(&event.session_id) {
            let _ = sink.send(event);
        }
    }

    /// Creates a per-URL handle that stamps session and URL context onto
    /// every event it emits
    pub fn scoped(
        &self,
        session_id: &str,
        url_index: usize,
        total_urls: usize,
        url: &str,
    ) -> UrlProgress {
        UrlProgress {
            emitter: self.clone(),
            session_id: session_id.to_string(),
            url_index,
            total_urls,
            url: url.to_string(),
        }
    }
}

/// Progress handle scoped to one URL of one session
#[derive(Debug, Clone)]
pub struct UrlProgress {
    emitter: ProgressEmitter,
    session_id: String,
    url_index: usize,
    total_urls: usize,
    url: String,
}

impl UrlProgress {
    fn emit(&self, status: CrawlStatus, message: String, error: Option<String>) {
        self.emitter.emit(ProgressEvent {
            session_id: self.session_id.clone(),
            url_index: self.url_index,
            total_urls: self.total_urls,
            status,
            url: self.url.clone(),
            message,
            error,
        });
    }

    pub fn starting(&self) {
        self.emit(
            CrawlStatus::Starting,
            format!("Starting scrape for {}", self.url),
            None,
        );
    }

    pub fn loading(&self) {
        self.emit(
            CrawlStatus::Loading,
            "Page loaded, probing for transaction table".to_string(),
            None,
        );
    }

    pub fn scraping(&self, page: u32, rows: usize) {
        self.emit(
            CrawlStatus::Scraping,
            format!("Page {}: extracted {} row(s)", page, rows),
            None,
        );
    }

    pub fn completed(&self, total: usize) {
        self.emit(
            CrawlStatus::Completed,
            format!("Scraped {} transaction(s)", total),
            None,
        );
    }

    pub fn error(&self, error: &str) {
        self.emit(
            CrawlStatus::Error,
            "Scrape failed".to_string(),
            Some(error.to_string()),
        );
    }
}
