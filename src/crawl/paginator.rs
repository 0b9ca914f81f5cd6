//! Pagination controller
//!
//! This module drives one page session through repeated
//! load → extract → detect-next → advance cycles until the table is
//! exhausted, accumulating extracted records. The target site paginates
//! client-side: advancing pages updates the DOM without changing the
//! URL, so page state must be inferred from DOM affordances that may
//! legitimately vanish on the last page. Every wait is bounded and every
//! expected-absence condition (missing table, zero rows, missing or
//! disabled next control, idle-wait timeout) ends the loop as a normal
//! termination path. Only navigation failure and snapshot failure are
//! escalated as this URL's error.

use crate::browser::PageDriver;
use crate::config::{CrawlOptions, SiteAdapter};
use crate::crawl::extract::extract_rows;
use crate::progress::UrlProgress;
use crate::records::TransactionRecord;
use crate::Result;
use std::time::Duration;

/// Bounded wait for the table root marker after navigation
pub const TABLE_WAIT: Duration = Duration::from_secs(10);

/// Bounded wait for row elements at the start of each cycle
pub const ROW_WAIT: Duration = Duration::from_secs(5);

/// Bounded wait for the post-advance network-idle signal, which the
/// site does not reliably produce after client-side page changes
pub const IDLE_WAIT: Duration = Duration::from_secs(3);

/// Settle pause after expanding collapsed rows
pub const EXPAND_SETTLE: Duration = Duration::from_millis(800);

/// Settle pause after removing active filters
pub const FILTER_SETTLE: Duration = Duration::from_secs(1);

/// Settle pause after clicking the next control
pub const PAGE_SETTLE: Duration = Duration::from_secs(3);

/// Accumulated result of one fully paginated scrape
#[derive(Debug, Clone, PartialEq)]
pub struct PageSet {
    pub transactions: Vec<TransactionRecord>,
    /// Page counter value at loop exit. When an advance succeeds but the
    /// next page never renders rows, the advanced page is still counted.
    pub total_pages: u32,
}

/// Pagination affordance state on the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NextControl {
    Missing,
    Disabled,
    Enabled,
}

/// Drives one page session through the full pagination cycle
pub struct Paginator<'a> {
    adapter: &'a SiteAdapter,
    options: &'a CrawlOptions,
}

impl<'a> Paginator<'a> {
    pub fn new(adapter: &'a SiteAdapter, options: &'a CrawlOptions) -> Self {
        Self { adapter, options }
    }

    /// Runs the state machine to completion for one URL
    ///
    /// # Returns
    ///
    /// * `Ok(PageSet)` - The accumulated transactions and page count.
    ///   A missing table is a valid empty outcome, not an error.
    /// * `Err(ScrapeError)` - Navigation or snapshot failure; the URL's
    ///   error is isolated by the coordinator.
    pub async fn run(
        &self,
        driver: &dyn PageDriver,
        url: &str,
        progress: &UrlProgress,
    ) -> Result<PageSet> {
        progress.starting();

        driver
            .navigate(url, self.options.navigation_timeout())
            .await?;
        progress.loading();

        if !driver.wait_for(&self.adapter.table_root, TABLE_WAIT).await {
            tracing::info!("No transaction table found at {}", url);
            progress.completed(0);
            return Ok(PageSet {
                transactions: Vec::new(),
                total_pages: 1,
            });
        }

        self.clear_filters(driver).await;

        let mut transactions = Vec::new();
        let mut total_pages: u32 = 1;

        loop {
            if !driver.wait_for(&self.adapter.row, ROW_WAIT).await {
                tracing::debug!("No rows rendered on page {}, ending pagination", total_pages);
                break;
            }

            self.expand_rows(driver).await;

            let html = driver.content().await?;
            let rows = extract_rows(&html, self.adapter);
            tracing::debug!("Page {}: extracted {} row(s) from {}", total_pages, rows.len(), url);
            progress.scraping(total_pages, rows.len());
            transactions.extend(rows);

            match self.next_control(driver).await {
                NextControl::Missing => {
                    tracing::debug!("No next control on page {}, pagination complete", total_pages);
                    break;
                }
                NextControl::Disabled => {
                    tracing::debug!("Next control disabled on page {}, pagination complete", total_pages);
                    break;
                }
                NextControl::Enabled => {
                    if !self.advance(driver).await {
                        break;
                    }
                    total_pages += 1;
                }
            }
        }

        tracing::info!(
            "Scraped {} transaction(s) across {} page(s) from {}",
            transactions.len(),
            total_pages,
            url
        );
        progress.completed(transactions.len());

        Ok(PageSet {
            transactions,
            total_pages,
        })
    }

    /// Removes any active table filters. Best-effort: failure never
    /// blocks progress.
    async fn clear_filters(&self, driver: &dyn PageDriver) {
        match driver.click_all(&self.adapter.filter_remove).await {
            Ok(0) => {}
            Ok(cleared) => {
                tracing::debug!("Cleared {} active filter(s)", cleared);
                tokio::time::sleep(FILTER_SETTLE).await;
            }
            Err(e) => tracing::debug!("Filter clearing skipped: {}", e),
        }
    }

    /// Expands collapsed rows so detail-panel fields render. Best-effort.
    async fn expand_rows(&self, driver: &dyn PageDriver) {
        match driver.click_all(&self.adapter.collapsed_toggle).await {
            Ok(0) => {}
            Ok(expanded) => {
                tracing::trace!("Expanded {} row(s)", expanded);
                tokio::time::sleep(EXPAND_SETTLE).await;
            }
            Err(e) => tracing::debug!("Row expansion skipped: {}", e),
        }
    }

    /// Determines the pagination affordance on the current page
    ///
    /// Probe errors count as a missing or disabled control: the loop
    /// must stop, not fail, when the affordance cannot be read.
    async fn next_control(&self, driver: &dyn PageDriver) -> NextControl {
        match driver.exists(&self.adapter.next_button).await {
            Ok(false) | Err(_) => NextControl::Missing,
            Ok(true) => match driver.exists(&self.adapter.next_disabled).await {
                Ok(false) => NextControl::Enabled,
                Ok(true) | Err(_) => NextControl::Disabled,
            },
        }
    }

    /// Clicks the next control and lets the table re-render
    ///
    /// Returns false when the click fails, ending pagination with the
    /// accumulation intact. The idle wait is allowed to time out.
    async fn advance(&self, driver: &dyn PageDriver) -> bool {
        if let Err(e) = driver.click(&self.adapter.next_button).await {
            tracing::debug!("Next click failed, treating as end of pagination: {}", e);
            return false;
        }

        tokio::time::sleep(PAGE_SETTLE).await;

        if let Err(e) = driver.wait_for_idle(IDLE_WAIT).await {
            tracing::trace!("Idle wait after page advance: {}", e);
        }

        true
    }
}
