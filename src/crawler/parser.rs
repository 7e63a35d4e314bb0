//! Document parser for the evolution-chain API
//!
//! This module handles turning fetched JSON into typed documents and
//! deriving record fields from them:
//! - Chain listings, chain documents, species and variety documents
//! - Trailing numeric identifiers in resource URLs
//! - English display names, form names and elemental types

use crate::species::ElementalType;
use crate::{DexError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// A `{ "url": ... }` reference to another resource
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceLink {
    pub url: String,
}

/// A `{ "name": ..., "url": ... }` reference to another resource
#[derive(Debug, Clone, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// Paged listing of evolution chains
#[derive(Debug, Clone, Deserialize)]
pub struct ChainListing {
    pub count: u32,
    #[serde(default)]
    pub results: Vec<ResourceLink>,
}

/// A single evolution-chain document
#[derive(Debug, Clone, Deserialize)]
pub struct ChainDocument {
    pub chain: ChainLink,
}

/// One node of an evolution chain
#[derive(Debug, Clone, Deserialize)]
pub struct ChainLink {
    pub species: ResourceLink,
    #[serde(default)]
    pub evolves_to: Vec<ChainLink>,
}

/// A species document
#[derive(Debug, Clone, Deserialize)]
pub struct SpeciesDocument {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub names: Vec<LocalizedName>,
    pub generation: ResourceLink,
    #[serde(default)]
    pub evolves_from_species: Option<NamedResource>,
    #[serde(default)]
    pub is_legendary: bool,
    #[serde(default)]
    pub is_mythical: bool,
    #[serde(default)]
    pub has_gender_differences: bool,
    #[serde(default)]
    pub varieties: Vec<Variety>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalizedName {
    pub name: String,
    pub language: NamedResource,
}

/// A variety entry of a species; the first entry is the default variety
#[derive(Debug, Clone, Deserialize)]
pub struct Variety {
    pub pokemon: NamedResource,
}

/// A variety ("pokemon") document
#[derive(Debug, Clone, Deserialize)]
pub struct VarietyDocument {
    #[serde(default)]
    pub types: Vec<TypeSlot>,
    #[serde(default)]
    pub sprites: SpriteLinks,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeSlot {
    #[serde(default)]
    pub slot: u32,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpriteLinks {
    #[serde(default)]
    pub front_default: Option<String>,
    #[serde(default)]
    pub front_shiny: Option<String>,
    #[serde(default)]
    pub front_female: Option<String>,
    #[serde(default)]
    pub front_shiny_female: Option<String>,
}

/// Parses a JSON document fetched from `url`
pub fn parse_document<T: DeserializeOwned>(url: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| DexError::parse(url, e.to_string()))
}

/// Extracts the trailing numeric path segment of a resource URL
///
/// `https://pokeapi.co/api/v2/generation/12/` yields `Some(12)`.
pub fn trailing_id(url: &str) -> Option<u32> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
}

impl SpeciesDocument {
    /// English display name, falling back to the API name
    pub fn display_name(&self) -> String {
        self.names
            .iter()
            .find(|n| n.language.name == "en")
            .map(|n| n.name.clone())
            .unwrap_or_else(|| self.name.clone())
    }

    pub fn is_basic(&self) -> bool {
        self.evolves_from_species.is_none()
    }

    /// Generation number parsed from the generation resource URL
    pub fn generation_number(&self, url: &str) -> Result<u32> {
        trailing_id(&self.generation.url)
            .filter(|g| *g > 0)
            .ok_or_else(|| {
                DexError::parse(
                    url,
                    format!("unparseable generation url '{}'", self.generation.url),
                )
            })
    }
}

/// Derives a form name from a variety name
///
/// The species name is removed and the separator that joined it is stripped,
/// so `raichu-alola` of `raichu` yields `alola`.
pub fn derive_form_name(species_name: &str, variety_name: &str) -> String {
    let remainder = variety_name.replace(species_name, "");
    match remainder.strip_prefix(['-', '_', ' ']) {
        Some(stripped) => stripped.to_string(),
        None => remainder,
    }
}

impl VarietyDocument {
    /// Primary and secondary elemental types, ordered by slot
    pub fn elemental_types(&self, url: &str) -> Result<(ElementalType, ElementalType)> {
        let mut slots: Vec<&TypeSlot> = self.types.iter().collect();
        slots.sort_by_key(|s| s.slot);

        let parse = |slot: &TypeSlot| {
            slot.kind
                .name
                .parse::<ElementalType>()
                .map_err(|e| DexError::parse(url, e))
        };

        let first = slots
            .first()
            .ok_or_else(|| DexError::parse(url, "variety lists no types"))?;
        let type_a = parse(*first)?;
        let type_b = match slots.get(1) {
            Some(second) => parse(*second)?,
            None => ElementalType::None,
        };
        Ok((type_a, type_b))
    }
}
