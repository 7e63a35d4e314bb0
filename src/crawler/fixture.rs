/// In-memory data source and document builders for crawler tests
use crate::crawler::fetcher::DataSource;
use crate::species::Sprite;
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use image::{ImageFormat, Rgba, RgbaImage};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

pub const BASE: &str = "https://dex.test/api/v2/";

pub fn species_url(id: u32) -> String {
    format!("{}pokemon-species/{}/", BASE, id)
}

pub fn variety_url(name: &str) -> String {
    format!("{}pokemon/{}/", BASE, name)
}

pub fn sprite_url(name: &str) -> String {
    format!("{}sprites/{}.png", BASE, name)
}

pub fn chain_url(id: u32) -> String {
    format!("{}evolution-chain/{}/", BASE, id)
}

/// One node of a chain document
pub fn chain_link(id: u32, name: &str, evolves_to: Vec<Value>) -> Value {
    json!({
        "species": { "name": name, "url": species_url(id) },
        "evolves_to": evolves_to
    })
}

fn capitalized(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A solid-colour PNG of the given size
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// Serves canned documents and images by exact URL; anything else is NotFound
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    documents: Arc<HashMap<String, String>>,
    images: Arc<HashMap<String, Vec<u8>>>,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(self, url: &str, value: Value) -> Self {
        self.with_body(url, &value.to_string())
    }

    pub fn with_body(mut self, url: &str, body: &str) -> Self {
        Arc::make_mut(&mut self.documents).insert(url.to_string(), body.to_string());
        self
    }

    pub fn with_image(mut self, url: &str, bytes: Vec<u8>) -> Self {
        Arc::make_mut(&mut self.images).insert(url.to_string(), bytes);
        self
    }

    pub fn with_chain(self, id: u32, link: Value) -> Self {
        self.with_json(&chain_url(id), json!({ "id": id, "chain": link }))
    }

    /// Registers a generation-1 species and its varieties
    ///
    /// Every variety is single-typed `normal` with a 2x2 default sprite.
    pub fn with_species(
        mut self,
        id: u32,
        name: &str,
        evolves_from: Option<&str>,
        varieties: &[&str],
    ) -> Self {
        let variety_entries: Vec<Value> = varieties
            .iter()
            .enumerate()
            .map(|(i, v)| json!({ "is_default": i == 0, "pokemon": { "name": v, "url": variety_url(v) } }))
            .collect();

        self = self.with_json(
            &species_url(id),
            json!({
                "id": id,
                "name": name,
                "names": [{ "name": capitalized(name), "language": { "name": "en", "url": "" } }],
                "generation": { "name": "generation-i", "url": format!("{}generation/1/", BASE) },
                "evolves_from_species": evolves_from.map(|p| json!({ "name": p, "url": "" })),
                "is_legendary": false,
                "is_mythical": false,
                "has_gender_differences": false,
                "varieties": variety_entries
            }),
        );

        for variety in varieties {
            self = self
                .with_json(
                    &variety_url(variety),
                    json!({
                        "types": [{ "slot": 1, "type": { "name": "normal", "url": "" } }],
                        "sprites": { "front_default": sprite_url(variety), "front_shiny": null }
                    }),
                )
                .with_image(&sprite_url(variety), png_bytes(2, 2));
        }
        self
    }
}

#[async_trait]
impl DataSource for FixtureSource {
    async fn fetch_text(&self, url: &str) -> FetchResult<String> {
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                url: url.to_string(),
            })
    }

    async fn fetch_image(&self, url: &str) -> FetchResult<Sprite> {
        let bytes = self.images.get(url).ok_or_else(|| FetchError::NotFound {
            url: url.to_string(),
        })?;
        Sprite::decode(bytes).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}
