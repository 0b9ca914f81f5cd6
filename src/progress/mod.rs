//! Progress reporting for crawl sessions
//!
//! This module decouples progress from transport: controllers emit
//! structured events through a [`ProgressEmitter`], which relays them to
//! whatever sink was registered for the session (a live response stream,
//! a log drain, a test channel). Emission is best-effort while the
//! session is registered and a silent no-op afterwards.

mod emitter;
mod events;
mod registry;

pub use emitter::{ProgressEmitter, UrlProgress};
pub use events::{CrawlStatus, ProgressEvent};
pub use registry::{SessionEntry, SessionRegistry};
