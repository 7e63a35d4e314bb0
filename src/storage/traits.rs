//! Storage traits and error types
//!
//! This module defines the trait interface for catalog storage backends and
//! associated error types.

use crate::catalog::Catalog;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No catalog file at {0}")]
    NotFound(PathBuf),

    #[error("Unsupported catalog format version {0}")]
    UnsupportedVersion(u32),

    #[error("Corrupt catalog: {0}")]
    Corrupt(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to replace catalog file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Descriptive header of a saved catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogMetadata {
    pub format_version: u32,
    pub saved_at: DateTime<Utc>,

    /// Registered identifiers at save time (forms excluded)
    pub species_count: usize,

    /// Hash of the configuration the catalog was crawled with
    pub config_hash: String,
}

/// Trait for catalog storage backend implementations
///
/// A store holds exactly one catalog; writing replaces whatever was there.
pub trait CatalogStore {
    /// Writes every tree of `catalog` together with its metadata
    fn write_catalog(&mut self, catalog: &Catalog, config_hash: &str) -> StorageResult<()>;

    /// Reads the metadata header, checking the format version
    fn metadata(&self) -> StorageResult<CatalogMetadata>;

    /// Rebuilds the stored catalog
    fn read_catalog(&self) -> StorageResult<Catalog>;
}
