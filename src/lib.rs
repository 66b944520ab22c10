// Re-export modules
pub mod browser;
pub mod config;
pub mod crawlers;
pub mod errors;
pub mod filter;
pub mod parsers;
pub mod results;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::AuditConfig;
pub use crawlers::CrawlReport;
pub use errors::AuditError;
pub use results::{ArticleLink, AuditResult, ExtractedMetadata, PageTarget};

use browser::{Browser, WebDriverBrowser};
use crawlers::Crawler;
use std::path::PathBuf;

/// Main builder for an SEO audit run
pub struct SeoAudit {
    config: AuditConfig,
}

impl SeoAudit {
    /// Create a new builder auditing the site at `base_url` with default settings
    pub fn new(base_url: &str) -> Self {
        Self {
            config: AuditConfig::new(base_url),
        }
    }

    /// Set the configuration from an [`AuditConfig`]
    pub fn with_config(mut self, config: AuditConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a file
    pub fn with_config_file(self, path: impl AsRef<std::path::Path>) -> Result<Self, AuditError> {
        let config = AuditConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Load configuration from a string
    pub fn with_config_str(self, config_str: &str) -> Result<Self, AuditError> {
        let config = AuditConfig::from_json(config_str)?;
        Ok(self.with_config(config))
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.to_string();
        self
    }

    /// Set the directory for screenshots and JSON artifacts
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Set the maximum number of discovered articles to audit
    pub fn with_article_limit(mut self, limit: usize) -> Self {
        self.config.discovery.article_limit = limit;
        self
    }

    /// Set the per-navigation timeout
    pub fn with_navigation_timeout(mut self, timeout_ms: u64) -> Self {
        self.config.navigation_timeout_ms = timeout_ms;
        self
    }

    pub fn with_webdriver_url(mut self, url: &str) -> Self {
        self.config.webdriver.url = url.to_string();
        self
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Start a browser over WebDriver and run the audit.
    ///
    /// Fails only if the configuration is invalid, no browser session can be
    /// started, or the artifacts cannot be written.
    pub async fn run(mut self) -> Result<CrawlReport, AuditError> {
        // Override the WebDriver URL with an environment variable if provided
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.config.webdriver.url = webdriver_url;
            }
        }
        self.config.validate()?;

        ::log::info!("Starting SEO audit for: {}", self.config.base_url);
        let browser =
            WebDriverBrowser::launch(&self.config.webdriver, self.config.navigation_timeout())
                .await?;
        self.run_with_browser(Box::new(browser)).await
    }

    /// Run the audit on an already started browser
    pub async fn run_with_browser(self, browser: Box<dyn Browser>) -> Result<CrawlReport, AuditError> {
        self.config.validate()?;
        Crawler::new(self.config, browser).run().await
    }
}
