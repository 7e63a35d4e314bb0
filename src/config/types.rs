use serde::Deserialize;

/// Main configuration structure for Dex-Ripple
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Remote data source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Base address of the API, with a trailing slash
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of concurrent crawl workers
    #[serde(default = "default_workers")]
    pub workers: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory holding the saved catalog file
    #[serde(rename = "catalog-dir")]
    pub catalog_dir: String,

    /// Directory that sprite images are exported to
    #[serde(rename = "image-dir")]
    pub image_dir: String,

    /// Path to the markdown summary file
    #[serde(rename = "summary-path")]
    pub summary_path: String,
}

fn default_base_url() -> String {
    "https://pokeapi.co/api/v2/".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_workers() -> u32 {
    8
}
