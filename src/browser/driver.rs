//! Page driver abstraction over the browser engine
//!
//! The browser engine is consumed as a black-box capability: navigate,
//! bounded selector waits, clicks, script evaluation, and DOM snapshots.
//! The pagination state machine only ever sees the [`PageDriver`] trait,
//! so tests can substitute a scripted driver and the CDP implementation
//! stays swappable.

use crate::{Result, ScrapeError};
use async_trait::async_trait;
use chromiumoxide::Page;
use std::time::Duration;

/// Polling interval for bounded selector waits
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// One browser tab bound to one target URL
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigates and waits for the load to settle, bounded by `timeout`
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;

    /// Bounded wait for a selector to appear. Returns false on timeout;
    /// never an error, because expected absence is a normal outcome.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> bool;

    /// Checks selector presence without waiting
    async fn exists(&self, selector: &str) -> Result<bool>;

    /// Clicks the first element matching the selector
    async fn click(&self, selector: &str) -> Result<()>;

    /// Clicks every element matching the selector, returning the count
    async fn click_all(&self, selector: &str) -> Result<usize>;

    /// Bounded wait for the network-idle heuristic
    async fn wait_for_idle(&self, timeout: Duration) -> Result<()>;

    /// Snapshot of the current DOM as HTML
    async fn content(&self) -> Result<String>;

    /// Evaluates a script in the page context
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;

    /// Closes the tab
    async fn close(&self) -> Result<()>;
}

/// [`PageDriver`] implementation over a chromiumoxide CDP page
pub struct CdpDriver {
    page: Page,
}

impl CdpDriver {
    pub fn new(page: Page) -> Self {
        Self { page }
    }
}

#[async_trait]
impl PageDriver for CdpDriver {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        let load = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        };

        match tokio::time::timeout(timeout, load).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ScrapeError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(ScrapeError::NavigationTimeout {
                url: url.to_string(),
            }),
        }
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn exists(&self, selector: &str) -> Result<bool> {
        Ok(self.page.find_element(selector).await.is_ok())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self.page.find_element(selector).await.map_err(|_| {
            ScrapeError::ElementMissing {
                selector: selector.to_string(),
            }
        })?;
        element.click().await?;
        Ok(())
    }

    async fn click_all(&self, selector: &str) -> Result<usize> {
        let script = format!(
            "(() => {{ const els = document.querySelectorAll({sel}); \
             for (const el of els) el.click(); return els.length; }})()",
            sel = serde_json::to_string(selector)?,
        );
        let clicked = self.evaluate(&script).await?;
        Ok(clicked.as_u64().unwrap_or(0) as usize)
    }

    async fn wait_for_idle(&self, timeout: Duration) -> Result<()> {
        match tokio::time::timeout(timeout, self.page.wait_for_navigation()).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(ScrapeError::Cdp(e)),
            Err(_) => Err(ScrapeError::WaitTimeout {
                what: "network idle".to_string(),
                waited_ms: timeout.as_millis() as u64,
            }),
        }
    }

    async fn content(&self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| ScrapeError::Evaluate(e.to_string()))?;
        result
            .into_value()
            .map_err(|e| ScrapeError::Evaluate(e.to_string()))
    }

    async fn close(&self) -> Result<()> {
        self.page.clone().close().await?;
        Ok(())
    }
}
