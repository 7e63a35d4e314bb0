//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the CatalogStore trait.

use crate::catalog::Catalog;
use crate::species::{Arctype, ElementalType, SpeciesRecord, Sprite, SpriteEntry, SpriteKind, SpriteSet};
use crate::storage::schema::{initialize_schema, Relation, FORMAT_VERSION};
use crate::storage::traits::{CatalogMetadata, CatalogStore, StorageError, StorageResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Transaction};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// SQLite storage backend
pub struct SqliteCatalogStore {
    conn: Connection,
}

impl SqliteCatalogStore {
    /// Creates a new catalog file at `path` with an empty schema
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteCatalogStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn create(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Opens an existing catalog file read-only
    pub fn open(path: &Path) -> StorageResult<Self> {
        if !path.is_file() {
            return Err(StorageError::NotFound(path.to_path_buf()));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Closes the connection, flushing everything to disk
    pub fn close(self) -> StorageResult<()> {
        self.conn.close().map_err(|(_, e)| StorageError::Sqlite(e))
    }

    fn meta_value(&self, key: &str) -> StorageResult<String> {
        self.conn
            .query_row("SELECT value FROM meta WHERE key = ?1", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?
            .ok_or_else(|| StorageError::Corrupt(format!("missing metadata '{}'", key)))
    }
}

fn write_meta(tx: &Transaction<'_>, key: &str, value: &str) -> StorageResult<()> {
    tx.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)",
        params![key, value],
    )?;
    Ok(())
}

/// Writes `record` and everything below it, returning the number of rows
fn write_tree(
    tx: &Transaction<'_>,
    record: &SpeciesRecord,
    parent_row: Option<i64>,
    relation: Relation,
    position: usize,
) -> StorageResult<usize> {
    tx.execute(
        "INSERT INTO species (parent_row, relation, position, species_id, name, generation,
                              type_a, type_b, form_name, is_default, arctype, is_basic)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            parent_row,
            relation.to_db_string(),
            position as i64,
            record.id,
            record.name,
            record.generation,
            record.type_a.as_str(),
            record.type_b.as_str(),
            record.form_name,
            record.is_default,
            record.arctype.to_db_string(),
            record.is_basic,
        ],
    )?;
    let row_id = tx.last_insert_rowid();

    for (kind, entry) in record.sprites.iter() {
        let image = entry.image.as_ref();
        tx.execute(
            "INSERT INTO sprites (row_id, kind, link, width, height, png)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                row_id,
                kind.to_db_string(),
                entry.link,
                image.map(|i| i.width),
                image.map(|i| i.height),
                image.map(|i| i.png.as_slice()),
            ],
        )?;
    }

    let mut rows = 1;
    for (i, form) in record.forms.iter().enumerate() {
        rows += write_tree(tx, form, Some(row_id), Relation::Form, i)?;
    }
    for (i, evolution) in record.evolutions.iter().enumerate() {
        rows += write_tree(tx, evolution, Some(row_id), Relation::Evolution, i)?;
    }
    Ok(rows)
}

/// A stored row before its children are attached
struct StoredRow {
    parent_row: Option<i64>,
    relation: Relation,
    position: i64,
    record: SpeciesRecord,
}

fn corrupt_field(row_id: i64, field: &str, value: &str) -> StorageError {
    StorageError::Corrupt(format!("row {}: invalid {} '{}'", row_id, field, value))
}

/// Reassembles the tree rooted at `row_id`, consuming its rows
fn build_tree(
    row_id: i64,
    rows: &mut HashMap<i64, StoredRow>,
    children: &HashMap<i64, Vec<(Relation, i64, i64)>>,
) -> StorageResult<SpeciesRecord> {
    let mut record = rows
        .remove(&row_id)
        .map(|row| row.record)
        .ok_or_else(|| StorageError::Corrupt(format!("row {} is referenced twice", row_id)))?;

    for &(relation, _, child) in children.get(&row_id).into_iter().flatten() {
        let mut child_record = build_tree(child, rows, children)?;
        match relation {
            Relation::Form => {
                child_record.root = Some(record.id);
                record.forms.push(child_record);
            }
            Relation::Evolution => record.evolutions.push(Arc::new(child_record)),
            Relation::Root => {
                return Err(StorageError::Corrupt(format!(
                    "root row {} has a parent",
                    child
                )))
            }
        }
    }

    Ok(record)
}

impl CatalogStore for SqliteCatalogStore {
    fn write_catalog(&mut self, catalog: &Catalog, config_hash: &str) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM sprites", [])?;
        tx.execute("DELETE FROM species", [])?;
        tx.execute("DELETE FROM meta", [])?;

        let mut rows = 0;
        for (i, root) in catalog.chain_roots().iter().enumerate() {
            rows += write_tree(&tx, root, None, Relation::Root, i)?;
        }

        write_meta(&tx, "format_version", &FORMAT_VERSION.to_string())?;
        write_meta(&tx, "saved_at", &Utc::now().to_rfc3339())?;
        write_meta(&tx, "species_count", &catalog.len().to_string())?;
        write_meta(&tx, "config_hash", config_hash)?;
        tx.commit()?;

        tracing::debug!("Wrote {} species rows", rows);
        Ok(())
    }

    fn metadata(&self) -> StorageResult<CatalogMetadata> {
        let has_meta: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'meta'",
            [],
            |row| row.get(0),
        )?;
        if has_meta == 0 {
            return Err(StorageError::Corrupt("not a catalog file".to_string()));
        }

        let version = self.meta_value("format_version")?;
        let format_version: u32 = version
            .parse()
            .map_err(|_| StorageError::Corrupt(format!("invalid format version '{}'", version)))?;
        if format_version != FORMAT_VERSION {
            return Err(StorageError::UnsupportedVersion(format_version));
        }

        let saved_at = self.meta_value("saved_at")?;
        let saved_at = DateTime::parse_from_rfc3339(&saved_at)
            .map_err(|_| StorageError::Corrupt(format!("invalid timestamp '{}'", saved_at)))?
            .with_timezone(&Utc);

        let count = self.meta_value("species_count")?;
        let species_count = count
            .parse()
            .map_err(|_| StorageError::Corrupt(format!("invalid species count '{}'", count)))?;

        Ok(CatalogMetadata {
            format_version,
            saved_at,
            species_count,
            config_hash: self.meta_value("config_hash")?,
        })
    }

    fn read_catalog(&self) -> StorageResult<Catalog> {
        let metadata = self.metadata()?;

        let mut stmt = self.conn.prepare(
            "SELECT row_id, parent_row, relation, position, species_id, name, generation,
                    type_a, type_b, form_name, is_default, arctype, is_basic
             FROM species",
        )?;
        let raw_rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Option<i64>>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, u32>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, u32>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, String>(8)?,
                row.get::<_, String>(9)?,
                row.get::<_, bool>(10)?,
                row.get::<_, String>(11)?,
                row.get::<_, bool>(12)?,
            ))
        })?;

        let mut rows = HashMap::new();
        for raw in raw_rows {
            let (
                row_id,
                parent_row,
                relation,
                position,
                id,
                name,
                generation,
                type_a,
                type_b,
                form_name,
                is_default,
                arctype,
                is_basic,
            ) = raw?;

            let record = SpeciesRecord {
                id,
                name,
                generation,
                type_a: type_a
                    .parse::<ElementalType>()
                    .map_err(|_| corrupt_field(row_id, "type", &type_a))?,
                type_b: type_b
                    .parse::<ElementalType>()
                    .map_err(|_| corrupt_field(row_id, "type", &type_b))?,
                form_name,
                is_default,
                arctype: Arctype::from_db_string(&arctype)
                    .ok_or_else(|| corrupt_field(row_id, "arctype", &arctype))?,
                is_basic,
                sprites: SpriteSet::default(),
                forms: Vec::new(),
                evolutions: Vec::new(),
                root: None,
            };

            rows.insert(
                row_id,
                StoredRow {
                    parent_row,
                    relation: Relation::from_db_string(&relation)
                        .ok_or_else(|| corrupt_field(row_id, "relation", &relation))?,
                    position,
                    record,
                },
            );
        }

        let mut stmt = self
            .conn
            .prepare("SELECT row_id, kind, link, width, height, png FROM sprites")?;
        let sprites = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<u32>>(3)?,
                row.get::<_, Option<u32>>(4)?,
                row.get::<_, Option<Vec<u8>>>(5)?,
            ))
        })?;

        for sprite in sprites {
            let (row_id, kind, link, width, height, png) = sprite?;
            let kind = SpriteKind::from_db_string(&kind)
                .ok_or_else(|| corrupt_field(row_id, "sprite kind", &kind))?;
            let row = rows.get_mut(&row_id).ok_or_else(|| {
                StorageError::Corrupt(format!("sprite refers to missing row {}", row_id))
            })?;

            let image = match (width, height, png) {
                (Some(width), Some(height), Some(png)) => Some(Sprite { width, height, png }),
                _ => None,
            };
            *row.record.sprites.entry_mut(kind) = Some(SpriteEntry { link, image });
        }

        let mut roots = Vec::new();
        let mut children: HashMap<i64, Vec<(Relation, i64, i64)>> = HashMap::new();
        for (row_id, row) in &rows {
            match (row.relation, row.parent_row) {
                (Relation::Root, None) => roots.push((row.position, *row_id)),
                (Relation::Root, Some(_)) | (_, None) => {
                    return Err(StorageError::Corrupt(format!(
                        "row {} has an inconsistent parent",
                        row_id
                    )))
                }
                (relation, Some(parent)) => {
                    if !rows.contains_key(&parent) {
                        return Err(StorageError::Corrupt(format!(
                            "row {} refers to missing parent {}",
                            row_id, parent
                        )));
                    }
                    children
                        .entry(parent)
                        .or_default()
                        .push((relation, row.position, *row_id));
                }
            }
        }
        roots.sort_unstable();
        for siblings in children.values_mut() {
            siblings.sort_unstable();
        }

        let mut catalog = Catalog::new();
        for (_, row_id) in roots {
            let tree = build_tree(row_id, &mut rows, &children)?;
            catalog
                .insert(tree)
                .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        }

        if !rows.is_empty() {
            return Err(StorageError::Corrupt(format!(
                "{} rows are unreachable from any chain root",
                rows.len()
            )));
        }
        if catalog.len() != metadata.species_count {
            return Err(StorageError::Corrupt(format!(
                "expected {} species, found {}",
                metadata.species_count,
                catalog.len()
            )));
        }

        Ok(catalog)
    }
}
