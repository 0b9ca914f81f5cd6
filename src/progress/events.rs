use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of one URL's scrape within a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlStatus {
    /// A controller has been assigned to the URL
    Starting,

    /// Navigation finished, probing for the table
    Loading,

    /// Extracting rows, one event per table page
    Scraping,

    /// Pagination finished, accumulation complete
    Completed,

    /// The URL's scrape failed outright
    Error,
}

impl CrawlStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Loading => "loading",
            Self::Scraping => "scraping",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }

    /// Returns true if no further events follow for this URL
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One structured progress event
///
/// Events are append-only and ordered by emission time within a session;
/// across URLs of the same batch there is no ordering guarantee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub session_id: String,
    pub url_index: usize,
    pub total_urls: usize,
    pub status: CrawlStatus,
    pub url: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
