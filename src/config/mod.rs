//! Configuration module for Dex-Ripple
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use dex_ripple::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("dex.toml")).unwrap();
//! println!("Crawling with {} workers", config.crawler.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, SourceConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
