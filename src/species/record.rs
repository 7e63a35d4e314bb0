/// The species record: one variety of a species plus its forms and evolutions
use crate::species::kinds::{Arctype, ElementalType, FormKind};
use crate::species::sprites::{Sprite, SpriteKind, SpriteSet};
use std::sync::Arc;

/// A fully resolved species (or species variety)
///
/// The default variety owns its `forms` and `evolutions`. A form points back
/// at its default variety through `root`, which is the default variety's
/// identifier and is only ever used as a catalog lookup key.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesRecord {
    /// Species identifier; forms share it with their default variety
    pub id: u32,

    /// Display name
    pub name: String,

    pub generation: u32,

    pub type_a: ElementalType,

    /// `ElementalType::None` when the variety lists a single type
    pub type_b: ElementalType,

    /// Empty for the default variety
    pub form_name: String,

    pub is_default: bool,

    pub arctype: Arctype,

    /// True when the species evolves from nothing
    pub is_basic: bool,

    pub sprites: SpriteSet,

    /// Non-default varieties of this species
    pub forms: Vec<SpeciesRecord>,

    /// Species this one evolves into
    pub evolutions: Vec<Arc<SpeciesRecord>>,

    /// Identifier of the default variety, `None` for the default variety itself
    pub root: Option<u32>,
}

impl SpeciesRecord {
    pub fn is_form(&self) -> bool {
        self.root.is_some()
    }

    pub fn form_kind(&self) -> FormKind {
        FormKind::from_form_name(&self.form_name)
    }

    /// Finds a non-default variety by form name (case-insensitive)
    pub fn find_form(&self, form_name: &str) -> Option<&SpeciesRecord> {
        let wanted = form_name.to_lowercase();
        self.forms
            .iter()
            .find(|f| f.form_name.to_lowercase() == wanted)
    }

    pub fn sprite(&self, kind: SpriteKind) -> Option<&Sprite> {
        self.sprites.image(kind)
    }

    pub fn sprite_link(&self, kind: SpriteKind) -> Option<&str> {
        self.sprites.link(kind)
    }

    /// File stem used when exporting this record's sprites
    pub fn file_stem(&self) -> String {
        if self.form_name.trim().is_empty() {
            self.id.to_string()
        } else {
            format!("{}-{}", self.id, self.form_name)
        }
    }

    /// Identifiers of this record and every record reachable through evolutions
    pub fn chain_ids(&self) -> Vec<u32> {
        let mut ids = vec![self.id];
        for evolution in &self.evolutions {
            ids.extend(evolution.chain_ids());
        }
        ids
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A bare default-variety record for tests
    pub fn record(id: u32, name: &str) -> SpeciesRecord {
        SpeciesRecord {
            id,
            name: name.to_string(),
            generation: 1,
            type_a: ElementalType::Normal,
            type_b: ElementalType::None,
            form_name: String::new(),
            is_default: true,
            arctype: Arctype::Normal,
            is_basic: true,
            sprites: SpriteSet::default(),
            forms: Vec::new(),
            evolutions: Vec::new(),
            root: None,
        }
    }

    /// A non-default variety of `root`
    pub fn form_of(root: &SpeciesRecord, form_name: &str) -> SpeciesRecord {
        SpeciesRecord {
            form_name: form_name.to_string(),
            is_default: false,
            root: Some(root.id),
            ..record(root.id, &root.name)
        }
    }
}
