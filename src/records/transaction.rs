use serde::{Deserialize, Serialize};

/// A single scraped transaction row
///
/// Every field is optional: absence means the corresponding DOM cell was
/// missing from the row, not that extraction failed. Fields serialize in
/// camelCase and `None` fields are omitted entirely, so downstream JSON
/// never contains empty strings masquerading as data.
///
/// Invariant: `floor` is derived from `address` by unit-marker pattern
/// extraction and is never present without it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<String>,

    /// Floor area, read as the secondary value of the bedroom cell
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,

    /// Unit price, read as the secondary value of the price cell
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_sqft: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor_level: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_status: Option<String>,

    /// Lease term, only visible once the row's detail panel is expanded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lease: Option<String>,

    /// Full address, only visible once the row's detail panel is expanded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Floor number extracted from the address unit marker (e.g. "07"
    /// from "#07-12")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
}

impl TransactionRecord {
    /// Returns true if no field was extracted at all
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.bedrooms.is_none()
            && self.size.is_none()
            && self.price.is_none()
            && self.price_per_sqft.is_none()
            && self.floor_level.is_none()
            && self.build_status.is_none()
            && self.lease.is_none()
            && self.address.is_none()
            && self.floor.is_none()
    }
}
