use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for a batch crawl
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    #[serde(default)]
    pub crawl: CrawlOptions,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub adapter: SiteAdapter,

    /// Target URLs, scraped in order
    #[serde(default)]
    pub urls: Vec<String>,
}

/// Crawl behavior options
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlOptions {
    /// Number of browser instances to pre-allocate; URLs are assigned
    /// round-robin across them
    pub concurrency: u32,

    /// Whether browsers run without a visible window
    pub headless: bool,

    /// Navigation timeout in milliseconds
    #[serde(rename = "timeout")]
    pub timeout_ms: u64,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            concurrency: 3,
            headless: true,
            timeout_ms: 30_000,
        }
    }
}

impl CrawlOptions {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OutputConfig {
    /// Directory for session-addressed batch artifacts
    pub results_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_dir: "./results".to_string(),
        }
    }
}

/// Site-specific selectors and attribute keys
///
/// The pagination state machine is selector-agnostic: everything that
/// couples the engine to one site's DOM layout lives here, so a site
/// redesign changes configuration rather than control flow. Defaults
/// target the transaction-table layout the crate was built for.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SiteAdapter {
    /// Root marker element of the transaction table
    pub table_root: String,

    /// Selector for one collapsed transaction row
    pub row: String,

    /// Attribute used to address field containers within a row
    pub field_attr: String,

    /// Toggles of rows whose detail panel is not yet shown
    pub collapsed_toggle: String,

    /// Controls that remove an active table filter
    pub filter_remove: String,

    /// The "next page" control
    pub next_button: String,

    /// The next control in its disabled state (ancestor class marker)
    pub next_disabled: String,

    pub date_key: String,
    pub bedroom_key: String,
    pub price_key: String,
    pub floor_level_key: String,
    pub build_status_key: String,

    /// Detail-panel field keys, readable only after row expansion
    pub lease_key: String,
    pub address_key: String,
}

impl Default for SiteAdapter {
    fn default() -> Self {
        Self {
            table_root: r#"[data-automation-id="transaction-table"]"#.to_string(),
            row: r#"[data-automation-id="transaction-row"]"#.to_string(),
            field_attr: "data-automation-id".to_string(),
            collapsed_toggle:
                r#"[data-automation-id="transaction-row"]:not(.expanded) [data-automation-id="expand-toggle"]"#
                    .to_string(),
            filter_remove: r#"[data-automation-id="filter-remove"]"#.to_string(),
            next_button: r#"[data-automation-id="next-page"]"#.to_string(),
            next_disabled: r#"li.disabled [data-automation-id="next-page"]"#.to_string(),
            date_key: "row-date".to_string(),
            bedroom_key: "row-bedroom".to_string(),
            price_key: "row-price".to_string(),
            floor_level_key: "row-floorLevel".to_string(),
            build_status_key: "row-completed".to_string(),
            lease_key: "expanded-lease".to_string(),
            address_key: "expanded-address".to_string(),
        }
    }
}
