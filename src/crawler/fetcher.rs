//! Data source abstraction and its HTTP implementation
//!
//! This module handles all remote access for the crawler, including:
//! - The `DataSource` capability (fetch text, fetch image)
//! - Building HTTP clients with proper user agent strings
//! - Endpoint URLs of the evolution-chain API
//! - Error classification of failed requests

use crate::config::{Config, SourceConfig, UserAgentConfig};
use crate::species::Sprite;
use crate::{ConfigError, FetchError, FetchResult, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Remote access used by the crawler
///
/// Each crawl worker owns its own handle, so implementations are cloned
/// once per worker.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetches the body of `url` as text
    async fn fetch_text(&self, url: &str) -> FetchResult<String>;

    /// Fetches and decodes the image at `url`
    async fn fetch_image(&self, url: &str) -> FetchResult<Sprite>;
}

/// Endpoint URLs of the evolution-chain API
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// Creates endpoints under `base_url`
    ///
    /// A missing trailing `/` is appended so the last path segment survives
    /// joining.
    pub fn new(base_url: &str) -> std::result::Result<Self, ConfigError> {
        let mut base = Url::parse(base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// First page of the chain listing
    pub fn chain_listing(&self) -> String {
        self.join("evolution-chain/")
    }

    /// A single-entry listing page at `offset`
    pub fn chain_listing_page(&self, offset: u32) -> String {
        self.join(&format!("evolution-chain/?limit=1&offset={}", offset))
    }

    pub fn chain(&self, id: u32) -> String {
        self.join(&format!("evolution-chain/{}/", id))
    }

    fn join(&self, path: &str) -> String {
        match self.base.join(path) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{}", self.base, path),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `source` - Timeouts for the remote source
///
/// # Example
///
/// ```no_run
/// use dex_ripple::config::{SourceConfig, UserAgentConfig};
/// use dex_ripple::crawler::build_http_client;
///
/// let user_agent = UserAgentConfig {
///     crawler_name: "DexRipple".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&user_agent, &SourceConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    source: &SourceConfig,
) -> std::result::Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        user_agent.crawler_name,
        user_agent.crawler_version,
        user_agent.contact_url,
        user_agent.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(source.request_timeout_secs))
        .connect_timeout(Duration::from_secs(source.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `DataSource` backed by a reqwest client
///
/// Clones share the client's connection pool.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = build_http_client(&config.user_agent, &config.source)?;
        Ok(Self::new(client))
    }

    async fn get(&self, url: &str) -> FetchResult<reqwest::Response> {
        tracing::trace!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch_text(&self, url: &str) -> FetchResult<String> {
        let response = self.get(url).await?;
        response.text().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })
    }

    async fn fetch_image(&self, url: &str) -> FetchResult<Sprite> {
        let response = self.get(url).await?;
        let bytes = response.bytes().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;

        Sprite::decode(&bytes).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }

    fn test_source() -> HttpSource {
        let client = build_http_client(&create_test_config(), &SourceConfig::default()).unwrap();
        HttpSource::new(client)
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&create_test_config(), &SourceConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_endpoints() {
        let endpoints = Endpoints::new("https://pokeapi.co/api/v2/").unwrap();
        assert_eq!(
            endpoints.chain_listing(),
            "https://pokeapi.co/api/v2/evolution-chain/"
        );
        assert_eq!(
            endpoints.chain_listing_page(540),
            "https://pokeapi.co/api/v2/evolution-chain/?limit=1&offset=540"
        );
        assert_eq!(
            endpoints.chain(67),
            "https://pokeapi.co/api/v2/evolution-chain/67/"
        );
    }

    #[test]
    fn test_endpoints_keep_last_segment_without_trailing_slash() {
        let endpoints = Endpoints::new("https://pokeapi.co/api/v2").unwrap();
        assert_eq!(endpoints.base().as_str(), "https://pokeapi.co/api/v2/");
        assert_eq!(
            endpoints.chain(7),
            "https://pokeapi.co/api/v2/evolution-chain/7/"
        );
    }

    #[test]
    fn test_endpoints_reject_invalid_base() {
        assert!(Endpoints::new("not a url").is_err());
    }

    #[tokio::test]
    async fn test_fetch_text_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/doc"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"count": 3}"#))
            .mount(&server)
            .await;

        let body = test_source()
            .fetch_text(&format!("{}/doc", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, r#"{"count": 3}"#);
    }

    #[tokio::test]
    async fn test_fetch_text_classifies_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let source = test_source();
        let missing = source.fetch_text(&format!("{}/gone", server.uri())).await;
        assert!(matches!(missing, Err(FetchError::NotFound { .. })));

        let broken = source.fetch_text(&format!("{}/broken", server.uri())).await;
        assert!(matches!(broken, Err(FetchError::Status { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_fetch_image_rejects_non_image() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sprite.png"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let result = test_source()
            .fetch_image(&format!("{}/sprite.png", server.uri()))
            .await;
        assert!(matches!(result, Err(FetchError::Decode { .. })));
    }
}
