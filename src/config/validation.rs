use crate::config::types::{CrawlConfig, CrawlOptions, SiteAdapter};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_options(&config.crawl)?;
    validate_adapter(&config.adapter)?;
    validate_urls(&config.urls)?;
    Ok(())
}

/// Validates crawl behavior options
pub fn validate_options(options: &CrawlOptions) -> Result<(), ConfigError> {
    if options.concurrency < 1 || options.concurrency > 32 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 32, got {}",
            options.concurrency
        )));
    }

    if options.timeout_ms < 1_000 {
        return Err(ConfigError::Validation(format!(
            "timeout must be >= 1000ms, got {}ms",
            options.timeout_ms
        )));
    }

    Ok(())
}

/// Validates the target URL list
///
/// A missing or empty list is a client error: the batch must be rejected
/// before any browser instance is provisioned.
pub fn validate_urls(urls: &[String]) -> Result<(), ConfigError> {
    if urls.is_empty() {
        return Err(ConfigError::Validation(
            "urls must contain at least one target URL".to_string(),
        ));
    }

    for raw in urls {
        let url = Url::parse(raw).map_err(|_| ConfigError::InvalidUrl(raw.clone()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(raw.clone()));
        }
    }

    Ok(())
}

/// Validates that no adapter selector or key is blank
pub fn validate_adapter(adapter: &SiteAdapter) -> Result<(), ConfigError> {
    let fields = [
        ("table-root", &adapter.table_root),
        ("row", &adapter.row),
        ("field-attr", &adapter.field_attr),
        ("collapsed-toggle", &adapter.collapsed_toggle),
        ("filter-remove", &adapter.filter_remove),
        ("next-button", &adapter.next_button),
        ("next-disabled", &adapter.next_disabled),
        ("date-key", &adapter.date_key),
        ("bedroom-key", &adapter.bedroom_key),
        ("price-key", &adapter.price_key),
        ("floor-level-key", &adapter.floor_level_key),
        ("build-status-key", &adapter.build_status_key),
        ("lease-key", &adapter.lease_key),
        ("address-key", &adapter.address_key),
    ];

    for (name, value) in fields {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "adapter.{} must not be empty",
                name
            )));
        }
    }

    Ok(())
}
