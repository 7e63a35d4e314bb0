//! The species catalog
//!
//! This module holds the in-memory mapping from species identifier to species
//! record, name search over it, and the catalog-ready notification channel.

mod events;
mod search;

pub use events::{CatalogReady, ReadyNotifier, ReadySource};
pub use search::{classify_name, NameMatch};

use crate::species::SpeciesRecord;
use crate::{DexError, Result};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Identifier-keyed store of species records
///
/// Default varieties and every member of an evolution chain are keyed
/// directly. Forms are reachable only through their default variety.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<u32, Arc<SpeciesRecord>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a record and, recursively, every record in its evolutions
    ///
    /// Forms are not registered. The whole tree is checked before anything is
    /// registered, so a rejected insert leaves the catalog unchanged.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Every identifier in the tree was registered
    /// * `Err(DexError::DuplicateKey)` - An identifier is already registered or
    ///   occurs twice in the tree
    pub fn insert(&mut self, record: SpeciesRecord) -> Result<()> {
        self.insert_shared(Arc::new(record))
    }

    /// Same as [`Catalog::insert`] for a record that is already shared
    pub fn insert_shared(&mut self, record: Arc<SpeciesRecord>) -> Result<()> {
        let mut seen = HashSet::new();
        for id in record.chain_ids() {
            if self.entries.contains_key(&id) || !seen.insert(id) {
                return Err(DexError::DuplicateKey(id));
            }
        }

        self.register(record);
        Ok(())
    }

    fn register(&mut self, record: Arc<SpeciesRecord>) {
        for evolution in &record.evolutions {
            self.register(Arc::clone(evolution));
        }
        self.entries.insert(record.id, record);
    }

    pub fn get(&self, id: u32) -> Option<Arc<SpeciesRecord>> {
        self.entries.get(&id).cloned()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.entries.contains_key(&id)
    }

    /// Resolves the back-reference of a form to its default variety
    pub fn root_of(&self, record: &SpeciesRecord) -> Option<Arc<SpeciesRecord>> {
        record.root.and_then(|id| self.get(id))
    }

    /// Case-insensitive name search
    ///
    /// Returns `None` for an empty or blank query. Otherwise the whole catalog
    /// is scanned in parallel; if any name equals the query exactly only the
    /// exact matches are returned, else every name containing the query.
    /// Results are ordered by identifier.
    pub fn find_by_name(&self, query: &str) -> Option<Vec<Arc<SpeciesRecord>>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        let hits: Vec<(NameMatch, Arc<SpeciesRecord>)> = self
            .entries
            .par_iter()
            .filter_map(|(_, record)| {
                classify_name(&record.name, &needle).map(|m| (m, Arc::clone(record)))
            })
            .collect();

        let (exact, partial): (Vec<_>, Vec<_>) = hits
            .into_iter()
            .partition(|(kind, _)| *kind == NameMatch::Exact);

        let mut results: Vec<Arc<SpeciesRecord>> = if exact.is_empty() {
            partial.into_iter().map(|(_, r)| r).collect()
        } else {
            exact.into_iter().map(|(_, r)| r).collect()
        };
        results.sort_by_key(|r| r.id);
        Some(results)
    }

    /// Every registered record, in no particular order
    pub fn all(&self) -> Vec<Arc<SpeciesRecord>> {
        self.entries.values().cloned().collect()
    }

    /// Records that are not an evolution of any other registered record
    pub fn chain_roots(&self) -> Vec<Arc<SpeciesRecord>> {
        let evolved: HashSet<u32> = self
            .entries
            .values()
            .flat_map(|r| r.evolutions.iter().map(|e| e.id))
            .collect();

        let mut roots: Vec<_> = self
            .entries
            .values()
            .filter(|r| !evolved.contains(&r.id))
            .cloned()
            .collect();
        roots.sort_by_key(|r| r.id);
        roots
    }

    /// Number of registered identifiers (forms are not counted)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn par_records(&self) -> impl ParallelIterator<Item = &Arc<SpeciesRecord>> + '_ {
        self.entries.par_iter().map(|(_, record)| record)
    }
}
