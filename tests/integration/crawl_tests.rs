//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small evolution-chain API and drive
//! the full cycle end-to-end: estimate, crawl, save, load, search, export.

use dex_ripple::config::{Config, CrawlerConfig, OutputConfig, SourceConfig, UserAgentConfig};
use dex_ripple::crawler::{estimate_max_chain_id, run_crawl, Endpoints, HttpSource};
use dex_ripple::output::export_images;
use dex_ripple::storage::{load_catalog, read_metadata, save_catalog};
use dex_ripple::{Arctype, ElementalType, ReadyNotifier, ReadySource, SpriteKind};
use image::{ImageFormat, Rgba, RgbaImage};
use serde_json::{json, Value};
use std::io::Cursor;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, dir: &TempDir, workers: u32) -> Config {
    Config {
        source: SourceConfig {
            base_url: base_url.to_string(),
            request_timeout_secs: 5,
            connect_timeout_secs: 5,
        },
        crawler: CrawlerConfig { workers },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            catalog_dir: dir.path().join("dex").to_string_lossy().into_owned(),
            image_dir: dir.path().join("sprites").to_string_lossy().into_owned(),
            summary_path: dir.path().join("summary.md").to_string_lossy().into_owned(),
        },
    }
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba([10, 120, 200, 255]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

async fn mount_json(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

struct Dex<'a> {
    server: &'a MockServer,
    base: String,
}

impl<'a> Dex<'a> {
    fn new(server: &'a MockServer) -> Self {
        Self {
            server,
            base: format!("{}/api/v2/", server.uri()),
        }
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.base, route)
    }

    fn link(&self, id: u32, name: &str, evolves_to: Vec<Value>) -> Value {
        json!({
            "species": { "name": name, "url": self.url(&format!("pokemon-species/{}/", id)) },
            "evolves_to": evolves_to
        })
    }

    async fn listing(&self, count: u32, last_chain: u32) {
        // Mounted first so the paged request matches it before the bare listing
        Mock::given(method("GET"))
            .and(path("/api/v2/evolution-chain/"))
            .and(query_param("offset", (count - 1).to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": count,
                "results": [{ "url": self.url(&format!("evolution-chain/{}/", last_chain)) }]
            })))
            .mount(self.server)
            .await;
        mount_json(
            self.server,
            "/api/v2/evolution-chain/",
            json!({ "count": count, "results": [{ "url": self.url("evolution-chain/1/") }] }),
        )
        .await;
    }

    async fn chain(&self, id: u32, link: Value) {
        mount_json(
            self.server,
            &format!("/api/v2/evolution-chain/{}/", id),
            json!({ "id": id, "chain": link }),
        )
        .await;
    }

    #[allow(clippy::too_many_arguments)]
    async fn species(
        &self,
        id: u32,
        name: &str,
        display: &str,
        generation: u32,
        evolves_from: Option<&str>,
        mythical: bool,
        varieties: &[(&str, &str)],
    ) {
        let entries: Vec<Value> = varieties
            .iter()
            .enumerate()
            .map(|(i, (variety, _))| {
                json!({
                    "is_default": i == 0,
                    "pokemon": { "name": variety, "url": self.url(&format!("pokemon/{}/", variety)) }
                })
            })
            .collect();

        mount_json(
            self.server,
            &format!("/api/v2/pokemon-species/{}/", id),
            json!({
                "id": id,
                "name": name,
                "names": [
                    { "name": display, "language": { "name": "en", "url": "" } },
                    { "name": format!("{}-ja", name), "language": { "name": "ja", "url": "" } }
                ],
                "generation": { "name": "g", "url": self.url(&format!("generation/{}/", generation)) },
                "evolves_from_species": evolves_from.map(|p| json!({ "name": p, "url": "" })),
                "is_legendary": false,
                "is_mythical": mythical,
                "has_gender_differences": false,
                "varieties": entries
            }),
        )
        .await;

        for (variety, types) in varieties {
            let slots: Vec<Value> = types
                .split_whitespace()
                .enumerate()
                .map(|(i, t)| json!({ "slot": i + 1, "type": { "name": t, "url": "" } }))
                .collect();
            let sprite_route = format!("/sprites/{}.png", variety);
            mount_json(
                self.server,
                &format!("/api/v2/pokemon/{}/", variety),
                json!({
                    "types": slots,
                    "sprites": {
                        "front_default": format!("{}{}", self.server.uri(), sprite_route),
                        "front_shiny": null,
                        "front_female": null,
                        "front_shiny_female": null
                    }
                }),
            )
            .await;

            Mock::given(method("GET"))
                .and(path(sprite_route.as_str()))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_bytes(png_bytes(8, 8))
                        .insert_header("content-type", "image/png"),
                )
                .mount(self.server)
                .await;
        }
    }
}

/// Chains 1, 2 and 4 exist; chain 3 was removed upstream and returns 404
async fn mount_world(dex: &Dex<'_>) {
    dex.chain(
        1,
        dex.link(1, "bulbasaur", vec![dex.link(2, "ivysaur", vec![])]),
    )
    .await;
    dex.chain(
        2,
        dex.link(25, "pikachu", vec![dex.link(26, "raichu", vec![])]),
    )
    .await;
    dex.chain(4, dex.link(151, "mew", vec![])).await;

    dex.species(1, "bulbasaur", "Bulbasaur", 1, None, false, &[("bulbasaur", "grass poison")])
        .await;
    dex.species(2, "ivysaur", "Ivysaur", 1, Some("bulbasaur"), false, &[("ivysaur", "grass poison")])
        .await;
    dex.species(
        25,
        "pikachu",
        "Pikachu",
        1,
        None,
        false,
        &[("pikachu", "electric"), ("pikachu-gmax", "electric")],
    )
    .await;
    dex.species(
        26,
        "raichu",
        "Raichu",
        1,
        Some("pikachu"),
        false,
        &[("raichu", "electric"), ("raichu-alola", "electric psychic")],
    )
    .await;
    dex.species(151, "mew", "Mew", 1, None, true, &[("mew", "psychic")])
        .await;
}

#[tokio::test]
async fn test_estimate_against_http_source() {
    let server = MockServer::start().await;
    let dex = Dex::new(&server);
    dex.listing(3, 4).await;
    mount_world(&dex).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dex.base, &dir, 2);
    let source = HttpSource::from_config(&config).unwrap();
    let endpoints = Endpoints::new(&dex.base).unwrap();

    assert_eq!(estimate_max_chain_id(&source, &endpoints).await.unwrap(), 4);
}

#[tokio::test]
async fn test_full_cycle() {
    let server = MockServer::start().await;
    let dex = Dex::new(&server);
    dex.listing(3, 4).await;
    mount_world(&dex).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dex.base, &dir, 3);
    let notifier = ReadyNotifier::new();
    let mut events = notifier.subscribe();

    // Crawl
    let outcome = run_crawl(&config, &notifier).await.unwrap();
    let catalog = outcome.catalog;
    assert_eq!(outcome.report.max_id, 4);
    assert_eq!(outcome.report.visited(), 4);
    assert_eq!(outcome.report.failed(), 1);
    assert_eq!(catalog.len(), 5);

    let event = events.recv().await.unwrap();
    assert_eq!(event.source, ReadySource::Crawl);
    assert_eq!(event.species, 5);

    let raichu = catalog.get(26).unwrap();
    assert!(!raichu.is_basic);
    assert_eq!(raichu.forms.len(), 1);
    let alola = raichu.find_form("Alola").unwrap();
    assert_eq!(alola.type_b, ElementalType::Psychic);
    assert_eq!(catalog.root_of(alola).unwrap().id, 26);
    assert_eq!(catalog.get(151).unwrap().arctype, Arctype::Mythical);
    assert_eq!(catalog.get(1).unwrap().sprite(SpriteKind::Male).unwrap().width, 8);

    // Save and restore
    let catalog_dir = std::path::Path::new(&config.output.catalog_dir);
    save_catalog(&catalog, catalog_dir, "test-hash").unwrap();
    assert_eq!(read_metadata(catalog_dir).unwrap().species_count, 5);

    let restored = load_catalog(catalog_dir, &notifier).unwrap();
    let event = events.recv().await.unwrap();
    assert_eq!(event.source, ReadySource::Restore);
    for id in [1, 2, 25, 26, 151] {
        assert_eq!(restored.get(id), catalog.get(id));
    }

    // Search
    let saurs: Vec<u32> = restored
        .find_by_name("saur")
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(saurs, vec![1, 2]);
    let exact = restored.find_by_name("PIKACHU").unwrap();
    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0].forms[0].form_name, "gmax");
    assert!(restored.find_by_name("  ").is_none());

    // Export: one default sprite per record and per form
    let report = export_images(&restored, std::path::Path::new(&config.output.image_dir)).unwrap();
    assert_eq!(report.written, 7);
    assert_eq!(report.failed, 0);
    let alola_png = std::path::Path::new(&config.output.image_dir).join("26-alola.png");
    assert_eq!(
        image::guess_format(&std::fs::read(alola_png).unwrap()).unwrap(),
        ImageFormat::Png
    );
}

#[tokio::test]
async fn test_crawl_skips_broken_chain() {
    let server = MockServer::start().await;
    let dex = Dex::new(&server);
    dex.listing(4, 5).await;
    mount_world(&dex).await;

    // Chain 5 names a species whose document is malformed
    dex.chain(5, dex.link(999, "missingno", vec![])).await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon-species/999/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{ not json"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dex.base, &dir, 1);
    let outcome = run_crawl(&config, &ReadyNotifier::new()).await.unwrap();

    assert_eq!(outcome.report.max_id, 5);
    assert_eq!(outcome.report.failed(), 2);
    assert_eq!(outcome.catalog.len(), 5);
    assert!(!outcome.catalog.contains(999));
}
