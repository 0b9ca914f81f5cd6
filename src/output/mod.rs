//! Persisted crawl artifacts
//!
//! After a batch completes, its full result set is written as a JSON
//! document addressed by session id. This is a side effect of a batch,
//! not part of the core scraping contract.

mod artifact;

pub use artifact::{write_batch_artifact, write_json, BatchArtifact};
