//! Generic class-based element capture
//!
//! The second CLI mode: collect text, markup, tag name, and attributes
//! for every element matching a class name on one page.

use crate::browser::PageDriver;
use crate::crawl::paginator::IDLE_WAIT;
use crate::Result;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// One captured element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementCapture {
    pub text: String,
    pub html: String,
    pub tag: String,
    pub attributes: HashMap<String, String>,
}

/// Extracts every element with the given class from an HTML snapshot
pub fn extract_elements(html: &str, class: &str) -> Vec<ElementCapture> {
    let document = Html::parse_document(html);

    let selector = match Selector::parse(&format!(".{}", class.trim())) {
        Ok(selector) => selector,
        Err(_) => {
            tracing::warn!("Invalid class name: {}", class);
            return Vec::new();
        }
    };

    document
        .select(&selector)
        .map(|element| ElementCapture {
            text: element.text().collect::<String>().trim().to_string(),
            html: element.inner_html(),
            tag: element.value().name().to_string(),
            attributes: element
                .value()
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        })
        .collect()
}

/// Navigates to a URL and captures all elements with the given class
pub async fn capture_elements(
    driver: &dyn PageDriver,
    url: &str,
    class: &str,
    timeout: Duration,
) -> Result<Vec<ElementCapture>> {
    driver.navigate(url, timeout).await?;

    if let Err(e) = driver.wait_for_idle(IDLE_WAIT).await {
        tracing::trace!("Idle wait after load: {}", e);
    }

    let html = driver.content().await?;
    Ok(extract_elements(&html, class))
}
