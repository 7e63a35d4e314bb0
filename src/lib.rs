//! Dex-Ripple: a species catalog crawler
//!
//! This crate rebuilds a local catalog of species records from a remote
//! evolution-chain API, caches the catalog to disk and exposes lookup and
//! export operations over it.

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod output;
pub mod species;
pub mod storage;

use thiserror::Error;

/// Main error type for Dex-Ripple operations
#[derive(Debug, Error)]
pub enum DexError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Malformed document at {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Species {0} is already registered in the catalog")]
    DuplicateKey(u32),

    #[error("Persistence error: {0}")]
    Persistence(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Crawl worker failed: {0}")]
    Worker(String),
}

impl DexError {
    /// Builds a parse error for the document fetched from `url`
    pub fn parse(url: &str, message: impl Into<String>) -> Self {
        Self::Parse {
            url: url.to_string(),
            message: message.into(),
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised by a data source while fetching a document or an image
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("No document at {url}")]
    NotFound { url: String },

    #[error("Failed to decode image from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Result type alias for Dex-Ripple operations
pub type Result<T> = std::result::Result<T, DexError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for data source operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogReady, ReadyNotifier, ReadySource};
pub use config::Config;
pub use species::{Arctype, ElementalType, SpeciesRecord, SpriteKind};
