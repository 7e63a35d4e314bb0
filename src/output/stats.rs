//! Statistics over a catalog
//!
//! This module provides functionality for extracting and displaying
//! catalog statistics.

use crate::catalog::Catalog;
use crate::species::{Arctype, ElementalType, FormKind};
use std::collections::BTreeMap;

/// Catalog statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogStatistics {
    /// Registered species identifiers
    pub total_species: usize,

    /// Non-default varieties across all species
    pub total_forms: usize,

    /// Evolution chains (records nothing else evolves into)
    pub chains: usize,

    /// Species that evolve from nothing
    pub basic_species: usize,

    pub by_arctype: BTreeMap<Arctype, usize>,

    pub by_generation: BTreeMap<u32, usize>,

    /// Primary and secondary types, each counted once per species
    pub by_type: BTreeMap<ElementalType, usize>,

    /// Forms grouped by kind (mega, gmax, regional, ...)
    pub forms_by_kind: BTreeMap<String, usize>,

    /// Species without a single resolved sprite
    pub without_sprites: usize,
}

impl CatalogStatistics {
    /// Computes statistics for `catalog`
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut stats = Self {
            total_species: catalog.len(),
            chains: catalog.chain_roots().len(),
            ..Self::default()
        };

        for record in catalog.all() {
            stats.total_forms += record.forms.len();
            if record.is_basic {
                stats.basic_species += 1;
            }
            if !record.sprites.has_any_image() {
                stats.without_sprites += 1;
            }

            *stats.by_arctype.entry(record.arctype).or_insert(0) += 1;
            *stats.by_generation.entry(record.generation).or_insert(0) += 1;
            *stats.by_type.entry(record.type_a).or_insert(0) += 1;
            if record.type_b != ElementalType::None {
                *stats.by_type.entry(record.type_b).or_insert(0) += 1;
            }

            for form in &record.forms {
                let kind = match form.form_kind() {
                    FormKind::Default => "default",
                    FormKind::Mega => "mega",
                    FormKind::Gmax => "gmax",
                    FormKind::Alola => "alola",
                    FormKind::Galar => "galar",
                    FormKind::Other => "other",
                };
                *stats.forms_by_kind.entry(kind.to_string()).or_insert(0) += 1;
            }
        }

        stats
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CatalogStatistics) {
    println!("=== Catalog Statistics ===\n");

    println!("Overview:");
    println!("  Species: {}", stats.total_species);
    println!("  Forms: {}", stats.total_forms);
    println!("  Evolution chains: {}", stats.chains);
    println!("  Basic species: {}", stats.basic_species);
    println!("  Species without sprites: {}", stats.without_sprites);
    println!();

    println!("Species by Arctype:");
    for (arctype, count) in &stats.by_arctype {
        let percentage = if stats.total_species > 0 {
            (*count as f64 / stats.total_species as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", arctype, count, percentage);
    }
    println!();

    println!("Species by Generation:");
    for (generation, count) in &stats.by_generation {
        println!("  Generation {}: {}", generation, count);
    }
    println!();

    if !stats.by_type.is_empty() {
        println!("Species by Type:");
        // Sort types by count (descending)
        let mut type_counts: Vec<_> = stats.by_type.iter().collect();
        type_counts.sort_by(|a, b| b.1.cmp(a.1));
        for (kind, count) in type_counts {
            println!("  {}: {}", kind, count);
        }
        println!();
    }

    if !stats.forms_by_kind.is_empty() {
        println!("Forms by Kind:");
        for (kind, count) in &stats.forms_by_kind {
            println!("  {}: {}", kind, count);
        }
        println!();
    }
}
