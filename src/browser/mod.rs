//! Browser capability: the page driver abstraction and instance pool

mod driver;
mod pool;

pub use driver::{CdpDriver, PageDriver};
pub use pool::{BrowserPool, DriverPool};
