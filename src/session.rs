//! Session identifier derivation
//!
//! Session ids double as artifact filenames, so they must be
//! filesystem-safe and collision-resistant across batches: the id is a
//! truncated SHA-256 digest over the start timestamp and target URLs.

use sha2::{Digest, Sha256};

/// Derives a session identifier for a batch of target URLs
pub fn new_session_id(urls: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(chrono::Utc::now().to_rfc3339().as_bytes());
    for url in urls {
        hasher.update(url.as_bytes());
    }
    let digest = hex::encode(hasher.finalize());
    format!("crawl-{}", &digest[..16])
}
