//! Configuration module for Listing-Ripple
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Required search inputs may come from the file or from command-line overrides;
//! either way they are checked before any network activity.
//!
//! # Example
//!
//! ```no_run
//! use listing_ripple::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Will enqueue at most {} listings", config.crawler.max_results);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, RendererKind, SearchConfig, SearchOverrides, SiteConfig,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, load_config_with_overrides,
    parse_config,
};
pub use validation::validate;
