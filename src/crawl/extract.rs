//! Row extraction from table snapshots
//!
//! Pure functions from an HTML snapshot to transaction records. Fields
//! are addressed by the site adapter's data-attribute scheme; within a
//! field container the first child element carries the primary value and
//! the second child the secondary value (price vs. price per sqft,
//! bedroom count vs. floor area). Extraction is tolerant throughout: a
//! missing sub-element yields an omitted field, never an error that
//! aborts the row or the page.

use crate::config::SiteAdapter;
use crate::records::TransactionRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Matches a unit marker like "#07-12": hash, two or more digits, hyphen
static UNIT_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#(\d{2,})-").expect("unit marker pattern is valid"));

/// Extracts every transaction row visible in the snapshot, in DOM order
pub fn extract_rows(html: &str, adapter: &SiteAdapter) -> Vec<TransactionRecord> {
    let document = Html::parse_document(html);

    let row_selector = match Selector::parse(&adapter.row) {
        Ok(selector) => selector,
        Err(_) => {
            tracing::warn!("Invalid row selector: {}", adapter.row);
            return Vec::new();
        }
    };

    document
        .select(&row_selector)
        .map(|row| extract_row(row, adapter))
        .collect()
}

/// Extracts one row, including detail-panel fields if the panel is
/// rendered inside the row
fn extract_row(row: ElementRef<'_>, adapter: &SiteAdapter) -> TransactionRecord {
    let (date, _) = field_values(row, adapter, &adapter.date_key);
    let (bedrooms, size) = field_values(row, adapter, &adapter.bedroom_key);
    let (price, price_per_sqft) = field_values(row, adapter, &adapter.price_key);
    let (floor_level, _) = field_values(row, adapter, &adapter.floor_level_key);
    let (build_status, _) = field_values(row, adapter, &adapter.build_status_key);
    let (lease, _) = field_values(row, adapter, &adapter.lease_key);
    let (address, _) = field_values(row, adapter, &adapter.address_key);

    // Derived, never fabricated: only present when the address matches
    let floor = address.as_deref().and_then(floor_from_address);

    TransactionRecord {
        date,
        bedrooms,
        size,
        price,
        price_per_sqft,
        floor_level,
        build_status,
        lease,
        address,
        floor,
    }
}

/// Reads the primary and secondary values of one addressed field
///
/// Returns `(None, None)` when the container is absent. A container
/// without child elements contributes its own text as the primary value.
fn field_values(
    row: ElementRef<'_>,
    adapter: &SiteAdapter,
    key: &str,
) -> (Option<String>, Option<String>) {
    let selector = match Selector::parse(&format!(r#"[{}="{}"]"#, adapter.field_attr, key)) {
        Ok(selector) => selector,
        Err(_) => return (None, None),
    };

    let container = match row.select(&selector).next() {
        Some(container) => container,
        None => return (None, None),
    };

    let children: Vec<ElementRef<'_>> = container
        .children()
        .filter_map(ElementRef::wrap)
        .collect();

    match children.as_slice() {
        [] => (element_text(container), None),
        [primary] => (element_text(*primary), None),
        [primary, secondary, ..] => (element_text(*primary), element_text(*secondary)),
    }
}

/// Collected, trimmed text of an element; whitespace-only text is
/// absent, never an empty string
fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text: String = element.text().collect();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Derives the floor number from an address unit marker
///
/// "#07-12, Example Rd" yields "07"; an address without a unit marker
/// (or with fewer than two digits) yields nothing.
pub fn floor_from_address(address: &str) -> Option<String> {
    UNIT_MARKER
        .captures(address)
        .and_then(|captures| captures.get(1))
        .map(|digits| digits.as_str().to_string())
}
