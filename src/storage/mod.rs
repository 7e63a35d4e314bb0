//! Storage module for persisting the catalog
//!
//! This module handles saving and restoring the whole catalog, including:
//! - SQLite schema management for the catalog file
//! - Writing every evolution tree with its forms and sprites
//! - Versioned metadata checks on restore
//! - Atomic replacement of the catalog file

mod schema;
mod sqlite;
mod traits;

pub use schema::FORMAT_VERSION;
pub use sqlite::SqliteCatalogStore;
pub use traits::{CatalogMetadata, CatalogStore, StorageError, StorageResult};

use crate::catalog::{Catalog, CatalogReady, ReadyNotifier, ReadySource};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the catalog file inside the catalog directory
pub const CATALOG_FILE_NAME: &str = "poke.dex";

/// Path of the catalog file inside `dir`
pub fn catalog_path(dir: &Path) -> PathBuf {
    dir.join(CATALOG_FILE_NAME)
}

/// Saves the whole catalog to `dir/poke.dex`
///
/// The catalog is written to a temporary file in `dir` first and then moved
/// over any existing catalog file, so readers never see a partial file.
///
/// # Arguments
///
/// * `catalog` - The catalog to save
/// * `dir` - Catalog directory, created if missing
/// * `config_hash` - Hash of the configuration recorded in the metadata
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written catalog file
/// * `Err(StorageError)` - Failed to write the file
pub fn save_catalog(catalog: &Catalog, dir: &Path, config_hash: &str) -> StorageResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let destination = catalog_path(dir);

    let temp = tempfile::Builder::new()
        .prefix("poke")
        .suffix(".dex.tmp")
        .tempfile_in(dir)?;

    let mut store = SqliteCatalogStore::create(temp.path())?;
    store.write_catalog(catalog, config_hash)?;
    store.close()?;

    temp.persist(&destination)?;
    tracing::info!(
        "Saved {} species to {}",
        catalog.len(),
        destination.display()
    );
    Ok(destination)
}

/// Reads only the metadata header of the catalog in `dir`
pub fn read_metadata(dir: &Path) -> StorageResult<CatalogMetadata> {
    SqliteCatalogStore::open(&catalog_path(dir))?.metadata()
}

/// Restores the catalog from `dir/poke.dex` and announces it
///
/// # Returns
///
/// * `Ok(Catalog)` - The restored catalog
/// * `Err(StorageError)` - Missing, unreadable, foreign or corrupt file, or
///   an unsupported format version
pub fn load_catalog(dir: &Path, notifier: &ReadyNotifier) -> StorageResult<Catalog> {
    let path = catalog_path(dir);
    let store = SqliteCatalogStore::open(&path)?;
    let metadata = store.metadata()?;
    let catalog = store.read_catalog()?;

    tracing::info!(
        "Restored {} species from {} (saved {})",
        catalog.len(),
        path.display(),
        metadata.saved_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    notifier.notify(CatalogReady {
        source: ReadySource::Restore,
        species: catalog.len(),
    });
    Ok(catalog)
}
