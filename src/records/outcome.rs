use crate::records::TransactionRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Successful scrape of one URL
///
/// Transactions are ordered by page, then by row within the page.
/// Duplicates are not deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlResult {
    pub url: String,
    pub scraped_at: DateTime<Utc>,
    pub total_transactions: usize,
    /// Number of pages visited, always >= 1
    pub total_pages: u32,
    pub transactions: Vec<TransactionRecord>,
}

/// Failed scrape of one URL (extraction could not start or failed outright)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlFailure {
    pub url: String,
    pub error: String,
    /// Always empty; kept so every outcome shares the same JSON shape
    pub transactions: Vec<TransactionRecord>,
}

/// Per-URL outcome, tagged success/failure independently of sibling URLs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CrawlOutcome {
    Success(CrawlResult),
    Failure(CrawlFailure),
}

impl CrawlOutcome {
    /// Builds a failure outcome from a captured error message
    pub fn failure(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Failure(CrawlFailure {
            url: url.into(),
            error: error.into(),
            transactions: Vec::new(),
        })
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Success(result) => &result.url,
            Self::Failure(failure) => &failure.url,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The captured error message for failure outcomes
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(&failure.error),
        }
    }

    pub fn transactions(&self) -> &[TransactionRecord] {
        match self {
            Self::Success(result) => &result.transactions,
            Self::Failure(failure) => &failure.transactions,
        }
    }
}

/// Ordered per-URL outcomes for a batch, matching the input URL order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchResult {
    pub outcomes: Vec<CrawlOutcome>,
}

impl BatchResult {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of URLs that scraped successfully
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of URLs that failed
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}
