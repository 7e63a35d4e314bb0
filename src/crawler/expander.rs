//! Chain expansion: one chain document into a tree of species records
//!
//! Each node of a chain resolves to a species document. Its first variety
//! becomes the record, the remaining varieties become forms, and the node's
//! children are expanded recursively and attached as evolutions.

use crate::crawler::fetcher::DataSource;
use crate::crawler::parser::{
    derive_form_name, parse_document, ChainDocument, ChainLink, SpeciesDocument, Variety,
    VarietyDocument,
};
use crate::species::{Arctype, ElementalType, SpeciesRecord, SpriteEntry, SpriteKind, SpriteSet};
use crate::{DexError, Result};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type ExpandFuture<'b> = Pin<Box<dyn Future<Output = Result<SpeciesRecord>> + Send + 'b>>;

/// Expands chain documents fetched from a data source
pub struct ChainExpander<'a, S: DataSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: DataSource + ?Sized> ChainExpander<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Fetches the chain document at `chain_url` and expands its root node
    pub async fn expand_chain(&self, chain_url: &str) -> Result<SpeciesRecord> {
        let body = self.source.fetch_text(chain_url).await?;
        let document: ChainDocument = parse_document(chain_url, &body)?;
        self.expand(&document.chain).await
    }

    /// Expands one chain node and, recursively, everything it evolves into
    ///
    /// Any fetch or parse failure anywhere in the subtree fails the whole
    /// expansion.
    pub fn expand<'b>(&'b self, link: &'b ChainLink) -> ExpandFuture<'b> {
        Box::pin(async move {
            let mut root = self.resolve_species(&link.species.url).await?;
            for child in &link.evolves_to {
                let evolution = self.expand(child).await?;
                root.evolutions.push(Arc::new(evolution));
            }
            Ok(root)
        })
    }

    /// Builds the default record of a species together with its forms
    async fn resolve_species(&self, url: &str) -> Result<SpeciesRecord> {
        let body = self.source.fetch_text(url).await?;
        let species: SpeciesDocument = parse_document(url, &body)?;

        let (default_variety, other_varieties) = species
            .varieties
            .split_first()
            .ok_or_else(|| DexError::parse(url, "species lists no varieties"))?;

        let template = SpeciesRecord {
            id: species.id,
            name: species.display_name(),
            generation: species.generation_number(url)?,
            type_a: ElementalType::None,
            type_b: ElementalType::None,
            form_name: String::new(),
            is_default: true,
            arctype: Arctype::classify(species.id, species.is_legendary, species.is_mythical),
            is_basic: species.is_basic(),
            sprites: SpriteSet::default(),
            forms: Vec::new(),
            evolutions: Vec::new(),
            root: None,
        };

        let mut forms = Vec::with_capacity(other_varieties.len());
        for variety in other_varieties {
            let form = SpeciesRecord {
                form_name: derive_form_name(&species.name, &variety.pokemon.name),
                is_default: false,
                root: Some(species.id),
                ..template.clone()
            };
            forms.push(self.resolve_variety(&species, variety, form).await?);
        }

        let mut root = self
            .resolve_variety(&species, default_variety, template)
            .await?;
        root.forms = forms;

        tracing::trace!(
            "Resolved species {} ({}) with {} forms",
            root.id,
            root.name,
            root.forms.len()
        );
        Ok(root)
    }

    /// Fills in the types and sprites of `record` from a variety document
    async fn resolve_variety(
        &self,
        species: &SpeciesDocument,
        variety: &Variety,
        mut record: SpeciesRecord,
    ) -> Result<SpeciesRecord> {
        let url = &variety.pokemon.url;
        let body = self.source.fetch_text(url).await?;
        let document: VarietyDocument = parse_document(url, &body)?;

        let (type_a, type_b) = document.elemental_types(url)?;
        record.type_a = type_a;
        record.type_b = type_b;

        let links = document.sprites;
        let gendered = |link: Option<String>| link.filter(|_| species.has_gender_differences);
        let candidates = [
            (SpriteKind::Male, links.front_default),
            (SpriteKind::MaleShiny, links.front_shiny),
            (SpriteKind::Female, gendered(links.front_female)),
            (SpriteKind::FemaleShiny, gendered(links.front_shiny_female)),
        ];

        for (kind, link) in candidates {
            let Some(link) = link.filter(|l| !l.trim().is_empty()) else {
                continue;
            };
            let image = self.source.fetch_image(&link).await?;
            *record.sprites.entry_mut(kind) = Some(SpriteEntry {
                link,
                image: Some(image),
            });
        }

        Ok(record)
    }
}
