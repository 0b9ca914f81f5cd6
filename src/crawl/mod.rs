//! Crawl engine
//!
//! This module contains the core scraping logic:
//! - Tolerant row extraction from table snapshots
//! - The pagination state machine
//! - Generic class-based element capture
//! - Batch coordination with failure isolation

mod coordinator;
mod elements;
mod extract;
mod paginator;

pub use coordinator::{run_batch_session, BatchReport, Coordinator};
pub use elements::{capture_elements, extract_elements, ElementCapture};
pub use extract::{extract_rows, floor_from_address};
pub use paginator::{PageSet, Paginator};

use crate::config::CrawlConfig;
use crate::progress::{ProgressEvent, SessionRegistry};
use crate::Result;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Runs a batch crawl from a loaded configuration
///
/// Convenience wrapper over [`run_batch_session`] for callers that start
/// from a TOML config rather than individual arguments.
pub async fn crawl_batch(
    config: CrawlConfig,
    registry: Arc<SessionRegistry>,
    sink: UnboundedSender<ProgressEvent>,
) -> Result<BatchReport> {
    run_batch_session(
        &config.urls,
        config.crawl,
        config.adapter,
        registry,
        sink,
        Path::new(&config.output.results_dir),
    )
    .await
}
