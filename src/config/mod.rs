//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, plus the site adapter that carries every site-specific selector.
//!
//! # Example
//!
//! ```no_run
//! use pageturn::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawling {} URLs", config.urls.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CrawlConfig, CrawlOptions, OutputConfig, SiteAdapter};

// Re-export parser and validation entry points
pub use parser::load_config;
pub use validation::{validate, validate_urls};
