//! Crawl coordinator - batch fan-out and session lifecycle
//!
//! This module contains the fan-out layer that turns a list of target
//! URLs into an ordered batch of per-URL outcomes:
//! - Pre-allocating a bounded pool of browser instances
//! - Assigning URL `i` to pool slot `i mod C` (round-robin)
//! - Running all pagination controllers concurrently
//! - Isolating per-URL failures so one URL never aborts its siblings
//! - Tearing the pool down regardless of per-URL outcomes
//! - Managing the batch session (register sink, persist artifact,
//!   always deregister)

use crate::browser::{BrowserPool, DriverPool};
use crate::config::{validate_urls, CrawlOptions, SiteAdapter};
use crate::crawl::paginator::Paginator;
use crate::output::{write_batch_artifact, BatchArtifact};
use crate::progress::{ProgressEmitter, ProgressEvent, SessionRegistry};
use crate::records::{BatchResult, CrawlOutcome, CrawlResult};
use crate::session::new_session_id;
use crate::Result;
use chrono::Utc;
use futures::future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Batch fan-out coordinator
pub struct Coordinator {
    options: CrawlOptions,
    adapter: SiteAdapter,
    emitter: ProgressEmitter,
}

/// Final report for one batch session
#[derive(Debug)]
pub struct BatchReport {
    pub session_id: String,
    pub elapsed_ms: i64,
    pub batch: BatchResult,
    /// Where the artifact was persisted, when persistence succeeded
    pub artifact_path: Option<PathBuf>,
}

impl Coordinator {
    pub fn new(options: CrawlOptions, adapter: SiteAdapter, emitter: ProgressEmitter) -> Self {
        Self {
            options,
            adapter,
            emitter,
        }
    }

    /// Runs a full batch against a freshly provisioned browser pool
    ///
    /// Provisioning failure is the only batch-fatal error. Once the pool
    /// exists, the fan-out cannot fail - every URL's outcome is captured
    /// independently - and teardown always runs before returning.
    pub async fn run_batch(&self, session_id: &str, urls: &[String]) -> Result<BatchResult> {
        let pool =
            BrowserPool::launch(self.options.concurrency as usize, self.options.headless).await?;

        // Nothing between provisioning and teardown may early-return.
        let batch = self.run_with_pool(session_id, urls, &pool).await;
        pool.teardown().await;

        Ok(batch)
    }

    /// Fan-out over a prepared driver pool
    ///
    /// All URLs run concurrently on the async scheduler; each pagination
    /// controller exclusively owns its tab, so no cross-URL state is
    /// shared. Aggregation preserves the input URL order.
    pub async fn run_with_pool(
        &self,
        session_id: &str,
        urls: &[String],
        pool: &dyn DriverPool,
    ) -> BatchResult {
        let total = urls.len();
        tracing::info!(
            "Starting batch of {} URL(s) across {} browser slot(s)",
            total,
            pool.slots()
        );

        let crawls = urls
            .iter()
            .enumerate()
            .map(|(index, url)| self.crawl_url(session_id, index, total, url, pool));

        let outcomes = future::join_all(crawls).await;
        BatchResult { outcomes }
    }

    /// Scrapes one URL on its round-robin slot, capturing any failure
    /// into the outcome instead of propagating it
    async fn crawl_url(
        &self,
        session_id: &str,
        index: usize,
        total: usize,
        url: &str,
        pool: &dyn DriverPool,
    ) -> CrawlOutcome {
        let slot = index % pool.slots().max(1);
        let progress = self.emitter.scoped(session_id, index, total, url);

        let driver = match pool.page(slot).await {
            Ok(driver) => driver,
            Err(e) => {
                tracing::error!("Failed to open a tab for {}: {}", url, e);
                progress.error(&e.to_string());
                return CrawlOutcome::failure(url, e.to_string());
            }
        };

        let paginator = Paginator::new(&self.adapter, &self.options);
        let scraped = paginator.run(driver.as_ref(), url, &progress).await;

        if let Err(e) = driver.close().await {
            tracing::debug!("Tab close failed for {}: {}", url, e);
        }

        match scraped {
            Ok(pages) => CrawlOutcome::Success(CrawlResult {
                url: url.to_string(),
                scraped_at: Utc::now(),
                total_transactions: pages.transactions.len(),
                total_pages: pages.total_pages,
                transactions: pages.transactions,
            }),
            Err(e) => {
                tracing::error!("Scrape failed for {}: {}", url, e);
                progress.error(&e.to_string());
                CrawlOutcome::failure(url, e.to_string())
            }
        }
    }
}

/// Runs a complete batch crawl session
///
/// This is the entry point an external transport (HTTP handler, batch
/// CLI) calls:
///
/// 1. Validate the URL list (a client error, checked before any browser
///    is provisioned)
/// 2. Derive the session id and register the progress sink
/// 3. Run the coordinator
/// 4. Persist the session-addressed artifact
/// 5. Remove the session, which closes the progress stream
///
/// The session is removed on every path, including batch-fatal
/// provisioning failure.
pub async fn run_batch_session(
    urls: &[String],
    options: CrawlOptions,
    adapter: SiteAdapter,
    registry: Arc<SessionRegistry>,
    sink: UnboundedSender<ProgressEvent>,
    results_dir: &Path,
) -> Result<BatchReport> {
    validate_urls(urls)?;

    let session_id = new_session_id(urls);
    registry.register(&session_id, sink);
    let started_at = registry.started_at(&session_id).unwrap_or_else(Utc::now);

    let emitter = ProgressEmitter::new(Arc::clone(&registry));
    let coordinator = Coordinator::new(options, adapter, emitter);
    let outcome = coordinator.run_batch(&session_id, urls).await;

    // The session's lifetime bounds progress emission; remove it before
    // returning on every path.
    registry.remove(&session_id);

    let batch = outcome?;
    let elapsed_ms = (Utc::now() - started_at).num_milliseconds();

    let artifact = BatchArtifact {
        session_id: session_id.clone(),
        completed_at: Utc::now(),
        url_count: urls.len(),
        results: batch,
    };

    // Persistence is a side effect, not part of the core contract; a
    // write failure downgrades to a warning.
    let artifact_path = match write_batch_artifact(results_dir, &artifact) {
        Ok(path) => Some(path),
        Err(e) => {
            tracing::warn!("Failed to persist batch artifact: {}", e);
            None
        }
    };

    tracing::info!(
        "Batch session {} finished in {}ms ({} succeeded, {} failed)",
        session_id,
        elapsed_ms,
        artifact.results.succeeded(),
        artifact.results.failed()
    );

    Ok(BatchReport {
        session_id,
        elapsed_ms,
        batch: artifact.results,
        artifact_path,
    })
}
