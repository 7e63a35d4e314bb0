//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the catalog file.

/// Version written to the `meta` table; files with any other version are refused
pub const FORMAT_VERSION: u32 = 1;

/// SQL schema for the catalog file
pub const SCHEMA_SQL: &str = r#"
-- Key/value header: format_version, saved_at, species_count, config_hash
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- One row per record; trees are rebuilt from parent_row and relation
CREATE TABLE IF NOT EXISTS species (
    row_id INTEGER PRIMARY KEY,
    parent_row INTEGER REFERENCES species(row_id),
    relation TEXT NOT NULL,
    position INTEGER NOT NULL,
    species_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    generation INTEGER NOT NULL,
    type_a TEXT NOT NULL,
    type_b TEXT NOT NULL,
    form_name TEXT NOT NULL,
    is_default INTEGER NOT NULL,
    arctype TEXT NOT NULL,
    is_basic INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_species_parent ON species(parent_row);
CREATE INDEX IF NOT EXISTS idx_species_id ON species(species_id);

-- Sprite links with their PNG-encoded images
CREATE TABLE IF NOT EXISTS sprites (
    row_id INTEGER NOT NULL REFERENCES species(row_id),
    kind TEXT NOT NULL,
    link TEXT NOT NULL,
    width INTEGER,
    height INTEGER,
    png BLOB,
    PRIMARY KEY (row_id, kind)
);
"#;

/// How a stored row hangs off its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Relation {
    /// Top of an evolution chain; has no parent
    Root,
    /// Non-default variety of its parent
    Form,
    /// Species its parent evolves into
    Evolution,
}

impl Relation {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Form => "form",
            Self::Evolution => "evolution",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "root" => Some(Self::Root),
            "form" => Some(Self::Form),
            "evolution" => Some(Self::Evolution),
            _ => None,
        }
    }
}

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
