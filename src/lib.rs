//! Pageturn: a pagination-aware headless-browser scraper
//!
//! This crate extracts transaction-history tables from listing pages that use
//! client-side ("state-based") pagination, where advancing pages changes the
//! DOM without changing the URL. It drives a pool of headless browsers,
//! walks each table page by page, and normalizes scraped rows into
//! structured records with streaming progress reporting and per-URL
//! failure isolation.

pub mod browser;
pub mod config;
pub mod crawl;
pub mod output;
pub mod progress;
pub mod records;
pub mod session;

use thiserror::Error;

/// Main error type for Pageturn operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Navigation failed for {url}: {message}")]
    Navigation { url: String, message: String },

    #[error("Navigation timeout for {url}")]
    NavigationTimeout { url: String },

    #[error("Page evaluation failed: {0}")]
    Evaluate(String),

    #[error("Element not found: {selector}")]
    ElementMissing { selector: String },

    #[error("Wait for {what} timed out after {waited_ms}ms")]
    WaitTimeout { what: String, waited_ms: u64 },

    #[error("Browser protocol error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Pageturn operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{CrawlConfig, CrawlOptions, SiteAdapter};
pub use progress::{CrawlStatus, ProgressEmitter, ProgressEvent, SessionRegistry};
pub use records::{BatchResult, CrawlOutcome, CrawlResult, TransactionRecord};
