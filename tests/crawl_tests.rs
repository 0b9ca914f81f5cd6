//! Integration tests for the pagination engine
//!
//! These tests drive the paginator and coordinator through a scripted
//! page driver whose selector probes are answered by parsing real HTML
//! fixtures with scraper, covering the full cycle end-to-end without a
//! browser. Tests run with the tokio clock paused so the engine's
//! settle pauses resolve instantly.

use async_trait::async_trait;
use pageturn::browser::{DriverPool, PageDriver};
use pageturn::config::{CrawlOptions, SiteAdapter};
use pageturn::crawl::{run_batch_session, Coordinator, Paginator};
use pageturn::progress::{CrawlStatus, ProgressEmitter, ProgressEvent, SessionRegistry};
use pageturn::{Result, ScrapeError};
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

// ===== Fixtures =====

enum Pager {
    Enabled,
    Disabled,
    Missing,
}

fn tx_row(date: &str, address: &str) -> String {
    format!(
        r#"<tr data-automation-id="transaction-row" class="expanded">
            <td data-automation-id="row-date"><span>{date}</span></td>
            <td data-automation-id="row-bedroom"><span>3</span><span>980 sqft</span></td>
            <td data-automation-id="row-price"><span>S$1,000,000</span><span>S$1,020 psf</span></td>
            <td data-automation-id="row-floorLevel"><span>06 to 10</span></td>
            <td data-automation-id="row-completed"><span>Completed</span></td>
            <td>
                <div data-automation-id="expanded-lease"><span>99-year lease</span></div>
                <div data-automation-id="expanded-address"><span>{address}</span></div>
            </td>
        </tr>"#
    )
}

fn table_page(rows: usize, pager: Pager) -> String {
    let rows_html: String = (0..rows)
        .map(|i| tx_row(&format!("Jan 2024 #{i}"), "#07-12, Example Rd"))
        .collect();

    let pager_html = match pager {
        Pager::Enabled => {
            r#"<ul class="pagination"><li class="page-item"><a data-automation-id="next-page">Next</a></li></ul>"#
        }
        Pager::Disabled => {
            r#"<ul class="pagination"><li class="page-item disabled"><a data-automation-id="next-page">Next</a></li></ul>"#
        }
        Pager::Missing => "",
    };

    format!(
        r#"<html><body><div data-automation-id="transaction-table"><table><tbody>{rows_html}</tbody></table>{pager_html}</div></body></html>"#
    )
}

fn page_without_table() -> String {
    r#"<html><body><div class="empty-state">No transactions recorded</div></body></html>"#
        .to_string()
}

// ===== Scripted driver and pool =====

/// Scripted page driver: each URL maps to a sequence of HTML pages, and
/// selector probes are answered by parsing the current page
struct FakeDriver {
    scripts: Arc<HashMap<String, Vec<String>>>,
    current: Mutex<Option<(String, usize)>>,
}

impl FakeDriver {
    fn new(scripts: Arc<HashMap<String, Vec<String>>>) -> Self {
        Self {
            scripts,
            current: Mutex::new(None),
        }
    }

    fn html(&self) -> String {
        let state = self.current.lock().unwrap();
        match state.as_ref() {
            Some((url, index)) => self
                .scripts
                .get(url.as_str())
                .and_then(|pages| pages.get(*index))
                .cloned()
                .unwrap_or_default(),
            None => String::new(),
        }
    }

    fn matches(&self, selector: &str) -> usize {
        let document = Html::parse_document(&self.html());
        match Selector::parse(selector) {
            Ok(selector) => document.select(&selector).count(),
            Err(_) => 0,
        }
    }
}

#[async_trait]
impl PageDriver for FakeDriver {
    async fn navigate(&self, url: &str, _timeout: Duration) -> Result<()> {
        if !self.scripts.contains_key(url) {
            return Err(ScrapeError::Navigation {
                url: url.to_string(),
                message: "connection refused".to_string(),
            });
        }
        *self.current.lock().unwrap() = Some((url.to_string(), 0));
        Ok(())
    }

    async fn wait_for(&self, selector: &str, _timeout: Duration) -> bool {
        self.matches(selector) > 0
    }

    async fn exists(&self, selector: &str) -> Result<bool> {
        Ok(self.matches(selector) > 0)
    }

    async fn click(&self, selector: &str) -> Result<()> {
        if self.matches(selector) == 0 {
            return Err(ScrapeError::ElementMissing {
                selector: selector.to_string(),
            });
        }
        // Clicking the next control advances to the next scripted page
        let mut state = self.current.lock().unwrap();
        if let Some((url, index)) = state.as_mut() {
            if let Some(pages) = self.scripts.get(url.as_str()) {
                if *index + 1 < pages.len() {
                    *index += 1;
                }
            }
        }
        Ok(())
    }

    async fn click_all(&self, selector: &str) -> Result<usize> {
        Ok(self.matches(selector))
    }

    async fn wait_for_idle(&self, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        Ok(self.html())
    }

    async fn evaluate(&self, _script: &str) -> Result<serde_json::Value> {
        Ok(serde_json::Value::Null)
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Scripted pool that records how slots are used
struct FakePool {
    scripts: Arc<HashMap<String, Vec<String>>>,
    slots: usize,
    max_slot: AtomicUsize,
    pages_opened: AtomicUsize,
}

impl FakePool {
    fn new(scripts: HashMap<String, Vec<String>>, slots: usize) -> Self {
        Self {
            scripts: Arc::new(scripts),
            slots,
            max_slot: AtomicUsize::new(0),
            pages_opened: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DriverPool for FakePool {
    fn slots(&self) -> usize {
        self.slots
    }

    async fn page(&self, slot: usize) -> Result<Box<dyn PageDriver>> {
        self.max_slot.fetch_max(slot, Ordering::SeqCst);
        self.pages_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeDriver::new(Arc::clone(&self.scripts))))
    }
}

// ===== Helpers =====

fn emitter_with_registry() -> (Arc<SessionRegistry>, ProgressEmitter) {
    let registry = Arc::new(SessionRegistry::new());
    let emitter = ProgressEmitter::new(Arc::clone(&registry));
    (registry, emitter)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ===== Paginator tests =====

#[tokio::test(start_paused = true)]
async fn three_page_table_accumulates_all_rows() {
    let url = "https://example.test/listing/1".to_string();
    let scripts = HashMap::from([(
        url.clone(),
        vec![
            table_page(10, Pager::Enabled),
            table_page(10, Pager::Enabled),
            table_page(4, Pager::Disabled),
        ],
    )]);
    let driver = FakeDriver::new(Arc::new(scripts));

    let adapter = SiteAdapter::default();
    let options = CrawlOptions::default();
    let (_registry, emitter) = emitter_with_registry();
    let progress = emitter.scoped("sess", 0, 1, &url);

    let pages = Paginator::new(&adapter, &options)
        .run(&driver, &url, &progress)
        .await
        .unwrap();

    assert_eq!(pages.transactions.len(), 24);
    assert_eq!(pages.total_pages, 3);

    // Expanded-panel fields flow through, including the derived floor
    let first = &pages.transactions[0];
    assert_eq!(first.address.as_deref(), Some("#07-12, Example Rd"));
    assert_eq!(first.floor.as_deref(), Some("07"));
    assert_eq!(first.lease.as_deref(), Some("99-year lease"));
    assert_eq!(first.price_per_sqft.as_deref(), Some("S$1,020 psf"));
}

#[tokio::test(start_paused = true)]
async fn missing_table_is_a_successful_empty_outcome() {
    let url = "https://example.test/listing/empty".to_string();
    let scripts = HashMap::from([(url.clone(), vec![page_without_table()])]);
    let driver = FakeDriver::new(Arc::new(scripts));

    let adapter = SiteAdapter::default();
    let options = CrawlOptions::default();
    let (registry, emitter) = emitter_with_registry();
    let (tx, mut rx) = mpsc::unbounded_channel();
    registry.register("sess", tx);

    let pages = Paginator::new(&adapter, &options)
        .run(&driver, &url, &emitter.scoped("sess", 0, 1, &url))
        .await
        .unwrap();

    assert!(pages.transactions.is_empty());
    assert_eq!(pages.total_pages, 1);

    let statuses: Vec<CrawlStatus> = drain(&mut rx).iter().map(|e| e.status).collect();
    assert_eq!(
        statuses,
        vec![
            CrawlStatus::Starting,
            CrawlStatus::Loading,
            CrawlStatus::Completed
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn advanced_page_without_rows_still_counts() {
    // The counter increments right after a successful advance; when the
    // next cycle's row wait finds nothing, the loop ends but the counter
    // keeps the advanced page. This reporting quirk is intentional.
    let url = "https://example.test/listing/short".to_string();
    let scripts = HashMap::from([(
        url.clone(),
        vec![table_page(10, Pager::Enabled), table_page(0, Pager::Missing)],
    )]);
    let driver = FakeDriver::new(Arc::new(scripts));

    let adapter = SiteAdapter::default();
    let options = CrawlOptions::default();
    let (_registry, emitter) = emitter_with_registry();

    let pages = Paginator::new(&adapter, &options)
        .run(&driver, &url, &emitter.scoped("sess", 0, 1, &url))
        .await
        .unwrap();

    assert_eq!(pages.transactions.len(), 10);
    assert_eq!(pages.total_pages, 2);
}

#[tokio::test(start_paused = true)]
async fn navigation_failure_is_fatal_for_the_url() {
    let driver = FakeDriver::new(Arc::new(HashMap::new()));

    let adapter = SiteAdapter::default();
    let options = CrawlOptions::default();
    let (_registry, emitter) = emitter_with_registry();
    let url = "https://example.test/unreachable";

    let result = Paginator::new(&adapter, &options)
        .run(&driver, url, &emitter.scoped("sess", 0, 1, url))
        .await;

    assert!(matches!(result, Err(ScrapeError::Navigation { .. })));
}

// ===== Coordinator tests =====

#[tokio::test(start_paused = true)]
async fn batch_preserves_order_and_isolates_failures() {
    let url_ok_a = "https://example.test/listing/a".to_string();
    let url_broken = "https://example.test/listing/broken".to_string();
    let url_ok_b = "https://example.test/listing/b".to_string();

    // The broken URL is deliberately unscripted, so navigation fails
    let scripts = HashMap::from([
        (url_ok_a.clone(), vec![table_page(2, Pager::Missing)]),
        (url_ok_b.clone(), vec![table_page(1, Pager::Missing)]),
    ]);
    let pool = FakePool::new(scripts, 2);

    let (registry, emitter) = emitter_with_registry();
    let (tx, mut rx) = mpsc::unbounded_channel();
    registry.register("sess", tx);

    let coordinator = Coordinator::new(CrawlOptions::default(), SiteAdapter::default(), emitter);
    let urls = vec![url_ok_a.clone(), url_broken.clone(), url_ok_b.clone()];
    let batch = coordinator.run_with_pool("sess", &urls, &pool).await;

    assert_eq!(batch.len(), 3);
    assert_eq!(batch.succeeded(), 2);
    assert_eq!(batch.failed(), 1);

    // Outcomes keep the input URL order regardless of completion order
    assert_eq!(batch.outcomes[0].url(), url_ok_a);
    assert_eq!(batch.outcomes[1].url(), url_broken);
    assert_eq!(batch.outcomes[2].url(), url_ok_b);

    assert!(batch.outcomes[0].is_success());
    assert!(batch.outcomes[2].is_success());
    assert_eq!(batch.outcomes[0].transactions().len(), 2);
    assert_eq!(batch.outcomes[2].transactions().len(), 1);

    let error = batch.outcomes[1].error().unwrap();
    assert!(error.contains("connection refused"), "got: {error}");

    // The failing URL reported an error event; siblings completed
    let events = drain(&mut rx);
    let error_events: Vec<_> = events
        .iter()
        .filter(|e| e.status == CrawlStatus::Error)
        .collect();
    assert_eq!(error_events.len(), 1);
    assert_eq!(error_events[0].url, url_broken);
}

#[tokio::test(start_paused = true)]
async fn round_robin_stays_within_slot_budget() {
    let urls: Vec<String> = (0..5)
        .map(|i| format!("https://example.test/listing/{i}"))
        .collect();
    let scripts: HashMap<String, Vec<String>> = urls
        .iter()
        .map(|url| (url.clone(), vec![table_page(1, Pager::Missing)]))
        .collect();
    let pool = FakePool::new(scripts, 2);

    let (_registry, emitter) = emitter_with_registry();
    let coordinator = Coordinator::new(CrawlOptions::default(), SiteAdapter::default(), emitter);
    let batch = coordinator.run_with_pool("sess", &urls, &pool).await;

    assert_eq!(batch.len(), 5);
    assert_eq!(batch.succeeded(), 5);

    // URL i runs on slot i mod C; with C = 2 no slot index reaches 2
    assert!(pool.max_slot.load(Ordering::SeqCst) < 2);
    assert_eq!(pool.pages_opened.load(Ordering::SeqCst), 5);
}

// ===== Progress stream tests =====

#[tokio::test(start_paused = true)]
async fn session_events_are_ordered_and_stop_after_removal() {
    let url = "https://example.test/listing/1".to_string();
    let scripts = HashMap::from([(
        url.clone(),
        vec![table_page(3, Pager::Enabled), table_page(2, Pager::Disabled)],
    )]);
    let pool = FakePool::new(scripts, 1);

    let (registry, emitter) = emitter_with_registry();
    let (tx, mut rx) = mpsc::unbounded_channel();
    registry.register("sess", tx);

    let coordinator = Coordinator::new(
        CrawlOptions::default(),
        SiteAdapter::default(),
        emitter.clone(),
    );
    let urls = vec![url.clone()];
    coordinator.run_with_pool("sess", &urls, &pool).await;

    let statuses: Vec<CrawlStatus> = drain(&mut rx).iter().map(|e| e.status).collect();
    assert_eq!(
        statuses,
        vec![
            CrawlStatus::Starting,
            CrawlStatus::Loading,
            CrawlStatus::Scraping,
            CrawlStatus::Scraping,
            CrawlStatus::Completed
        ]
    );

    // Once the session is removed, further emits are silent no-ops
    registry.remove("sess");
    emitter.scoped("sess", 0, 1, &url).completed(0);
    assert!(drain(&mut rx).is_empty());
}

// ===== Batch session tests =====

#[tokio::test]
async fn empty_url_list_is_rejected_before_provisioning() {
    let registry = Arc::new(SessionRegistry::new());
    let (tx, _rx) = mpsc::unbounded_channel();
    let dir = tempfile::TempDir::new().unwrap();

    let result = run_batch_session(
        &[],
        CrawlOptions::default(),
        SiteAdapter::default(),
        Arc::clone(&registry),
        tx,
        dir.path(),
    )
    .await;

    assert!(matches!(result, Err(ScrapeError::Config(_))));
    // Nothing was registered for the rejected batch
    assert!(registry.is_empty());
}

#[tokio::test(start_paused = true)]
async fn outcome_json_matches_the_artifact_shape() {
    let url = "https://example.test/listing/1".to_string();
    let scripts = HashMap::from([(url.clone(), vec![table_page(1, Pager::Missing)])]);
    let pool = FakePool::new(scripts, 1);

    let (_registry, emitter) = emitter_with_registry();
    let coordinator = Coordinator::new(CrawlOptions::default(), SiteAdapter::default(), emitter);
    let urls = vec![url];
    let batch = coordinator.run_with_pool("sess", &urls, &pool).await;

    let json = serde_json::to_value(&batch).unwrap();
    let outcome = &json[0];
    assert_eq!(outcome["totalTransactions"], 1);
    assert_eq!(outcome["totalPages"], 1);
    assert_eq!(outcome["transactions"][0]["floor"], "07");
    assert!(outcome["transactions"][0].get("error").is_none());
}
