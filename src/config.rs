use crate::errors::AuditError;
use crate::results::PageTarget;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Width and height of a browsing context's visible area, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Configuration for the whole audit run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Origin of the audited site; relative seed URLs are resolved against it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Pages audited before discovery, in this order
    #[serde(default = "default_seeds")]
    pub seeds: Vec<PageTarget>,

    /// Directory receiving screenshots and the JSON artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_desktop_viewport")]
    pub desktop: Viewport,

    #[serde(default = "default_mobile_viewport")]
    pub mobile: Viewport,

    /// Per-navigation timeout in milliseconds
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub webdriver: WebDriverConfig,
}

/// Configuration for blog article discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Index and category pages scanned for article links
    #[serde(default = "default_index_urls")]
    pub index_urls: Vec<String>,

    /// Path prefix every article lives under
    #[serde(default = "default_article_prefix")]
    pub article_prefix: String,

    /// Maximum number of discovered articles to audit
    #[serde(default = "default_article_limit")]
    pub article_limit: usize,
}

/// Configuration for the WebDriver endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebDriverConfig {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub url: String,

    /// Endpoints tried in order when `url` refuses a session
    #[serde(default = "default_fallback_urls")]
    pub fallback_urls: Vec<String>,

    /// Request a headless browser
    #[serde(default = "default_headless")]
    pub headless: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            seeds: default_seeds(),
            output_dir: default_output_dir(),
            desktop: default_desktop_viewport(),
            mobile: default_mobile_viewport(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            discovery: DiscoveryConfig::default(),
            webdriver: WebDriverConfig::default(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            index_urls: default_index_urls(),
            article_prefix: default_article_prefix(),
            article_limit: default_article_limit(),
        }
    }
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            url: default_webdriver_url(),
            fallback_urls: default_fallback_urls(),
            headless: default_headless(),
        }
    }
}

impl AuditConfig {
    /// Create a configuration with default values for the given site
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AuditError> {
        let path = path.as_ref();
        let mut file = File::open(path)
            .map_err(|e| AuditError::Config(format!("cannot open {}: {}", path.display(), e)))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| AuditError::Config(format!("cannot read {}: {}", path.display(), e)))?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, AuditError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Check the values a run depends on before any browser is started
    pub fn validate(&self) -> Result<(), AuditError> {
        self.origin()?;

        if let Some(seed) = self.seeds.iter().find(|s| s.name.trim().is_empty()) {
            return Err(AuditError::Config(format!(
                "seed {} has an empty name",
                seed.url
            )));
        }
        for (label, viewport) in [("desktop", self.desktop), ("mobile", self.mobile)] {
            if viewport.width == 0 || viewport.height == 0 {
                return Err(AuditError::Config(format!(
                    "{} viewport must be non-empty, got {}x{}",
                    label, viewport.width, viewport.height
                )));
            }
        }
        if self.navigation_timeout_ms == 0 {
            return Err(AuditError::Config(
                "navigation timeout must be positive".to_string(),
            ));
        }
        if !self.discovery.article_prefix.starts_with('/') {
            return Err(AuditError::Config(format!(
                "article prefix {:?} must start with '/'",
                self.discovery.article_prefix
            )));
        }
        self.resolved_seeds()?;
        self.resolved_index_urls()?;
        Ok(())
    }

    /// The parsed site origin
    pub fn origin(&self) -> Result<Url, AuditError> {
        Url::parse(&self.base_url)
            .map_err(|e| AuditError::Config(format!("invalid base URL {}: {}", self.base_url, e)))
    }

    /// Resolve a possibly root-relative URL against the site origin
    pub fn resolve(&self, url: &str) -> Result<Url, AuditError> {
        self.origin()?
            .join(url)
            .map_err(|e| AuditError::Config(format!("invalid URL {}: {}", url, e)))
    }

    /// Seed targets with their URLs made absolute
    pub fn resolved_seeds(&self) -> Result<Vec<PageTarget>, AuditError> {
        self.seeds
            .iter()
            .map(|seed| Ok(PageTarget::new(self.resolve(&seed.url)?.as_str(), &seed.name)))
            .collect()
    }

    /// Discovery index pages made absolute
    pub fn resolved_index_urls(&self) -> Result<Vec<Url>, AuditError> {
        self.discovery
            .index_urls
            .iter()
            .map(|u| self.resolve(u))
            .collect()
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/".to_string()
}

fn default_seeds() -> Vec<PageTarget> {
    [
        ("/", "homepage"),
        ("/features", "features"),
        ("/how-it-works", "how-it-works"),
        ("/about", "about"),
        ("/faq", "faq"),
        ("/blog", "blog-index"),
        ("/blog/tax", "blog-tax"),
    ]
    .into_iter()
    .map(|(url, name)| PageTarget::new(url, name))
    .collect()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("screenshots")
}

fn default_desktop_viewport() -> Viewport {
    Viewport::new(1920, 1080)
}

fn default_mobile_viewport() -> Viewport {
    Viewport::new(375, 812)
}

fn default_navigation_timeout_ms() -> u64 {
    15_000
}

fn default_index_urls() -> Vec<String> {
    vec!["/blog".to_string(), "/blog/tax".to_string()]
}

fn default_article_prefix() -> String {
    "/blog/".to_string()
}

fn default_article_limit() -> usize {
    4
}

/// Default value for webdriver url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_fallback_urls() -> Vec<String> {
    vec![
        "http://localhost:9515".to_string(), // ChromeDriver default
        "http://127.0.0.1:4444".to_string(),
    ]
}

fn default_headless() -> bool {
    true
}
