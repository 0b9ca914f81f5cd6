//! Fixed-size pool of reusable browser instances
//!
//! The pool pre-allocates a bounded number of heavy resources (whole
//! browser processes) and hands out fresh tabs by slot index. URL
//! assignment to slots is the caller's concern (round-robin in the
//! coordinator); the pool only guarantees that slot count never exceeds
//! the configured budget and that teardown closes every instance.

use crate::browser::driver::{CdpDriver, PageDriver};
use crate::{Result, ScrapeError};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;

/// Source of page drivers, keyed by pool slot
#[async_trait]
pub trait DriverPool: Send + Sync {
    /// Number of allocated slots
    fn slots(&self) -> usize;

    /// Opens a fresh tab on the given slot's browser instance
    async fn page(&self, slot: usize) -> Result<Box<dyn PageDriver>>;
}

/// Pool of launched chromiumoxide browser instances
pub struct BrowserPool {
    browsers: Vec<Browser>,
    handlers: Vec<JoinHandle<()>>,
}

impl BrowserPool {
    /// Launches `size` browser instances up front
    ///
    /// Each instance gets its own CDP event handler task. A launch
    /// failure for any instance is batch-fatal; instances launched
    /// before the failure are closed again before returning.
    pub async fn launch(size: usize, headless: bool) -> Result<Self> {
        let mut pool = Self {
            browsers: Vec::with_capacity(size),
            handlers: Vec::with_capacity(size),
        };

        for slot in 0..size {
            let mut builder = BrowserConfig::builder().no_sandbox().args(vec![
                "--disable-dev-shm-usage",
                "--disable-gpu",
                "--no-first-run",
                "--no-default-browser-check",
                "--disable-background-networking",
            ]);
            if !headless {
                builder = builder.with_head();
            }
            let config = builder.build().map_err(ScrapeError::Launch)?;

            let launched = match Browser::launch(config).await {
                Ok(launched) => launched,
                Err(e) => {
                    pool.teardown().await;
                    return Err(ScrapeError::Launch(e.to_string()));
                }
            };
            let (browser, mut handler) = launched;

            let task = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if let Err(e) = event {
                        tracing::debug!("Browser {} event error: {}", slot, e);
                    }
                }
            });

            pool.browsers.push(browser);
            pool.handlers.push(task);
        }

        tracing::info!(
            "Launched {} browser instance(s) (headless: {})",
            size,
            headless
        );
        Ok(pool)
    }

    /// Closes every browser instance and stops its handler task
    ///
    /// Teardown never propagates errors; a browser that refuses to close
    /// is logged and skipped so the remaining instances still get closed.
    pub async fn teardown(mut self) {
        for (slot, browser) in self.browsers.iter_mut().enumerate() {
            if let Err(e) = browser.close().await {
                tracing::warn!("Failed to close browser {}: {}", slot, e);
                continue;
            }
            if let Err(e) = browser.wait().await {
                tracing::debug!("Browser {} did not exit cleanly: {}", slot, e);
            }
        }
        for handler in self.handlers.drain(..) {
            handler.abort();
        }
        tracing::debug!("Browser pool torn down");
    }
}

#[async_trait]
impl DriverPool for BrowserPool {
    fn slots(&self) -> usize {
        self.browsers.len()
    }

    async fn page(&self, slot: usize) -> Result<Box<dyn PageDriver>> {
        let browser = self
            .browsers
            .get(slot % self.browsers.len().max(1))
            .ok_or_else(|| ScrapeError::Launch("browser pool is empty".to_string()))?;

        let page = browser.new_page("about:blank").await?;
        Ok(Box::new(CdpDriver::new(page)))
    }
}
