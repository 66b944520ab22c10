//! Browser session management.
//!
//! A [`Session`] owns the one browser of a run. Every unit of work gets its
//! own [`BrowsingContext`], opened with [`Session::open_context`] and handed
//! back with [`Session::release`] on every exit path.

pub mod webdriver;

#[cfg(test)]
pub(crate) mod fake;

use crate::config::Viewport;
use crate::errors::AuditError;
use crate::parsers::PageCapture;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

pub use webdriver::WebDriverBrowser;

/// Which part of the page a screenshot covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureArea {
    /// The visible viewport only
    Viewport,
    /// The whole scrollable document
    FullPage,
}

/// A running browser able to open isolated contexts
#[async_trait]
pub trait Browser: Send + Sync {
    /// Open a context with independent cookies and storage
    async fn new_context(&self, viewport: Viewport) -> Result<Box<dyn BrowsingContext>, AuditError>;

    /// Shut the browser down
    async fn close(self: Box<Self>) -> Result<(), AuditError>;
}

/// One isolated browsing context
#[async_trait]
pub trait BrowsingContext: Send {
    /// Load `url` and wait for network idle. Returns the HTTP status, or 0
    /// when the browser saw no response.
    async fn goto(&mut self, url: &Url) -> Result<u16, AuditError>;

    /// PNG bytes of the current page
    async fn screenshot(&mut self, area: CaptureArea) -> Result<Vec<u8>, AuditError>;

    /// Capture the loaded document for extraction
    async fn capture(&mut self) -> Result<PageCapture, AuditError>;

    /// Discard the context and all of its state
    async fn close(self: Box<Self>) -> Result<(), AuditError>;
}

/// Hand back a freshly opened context once its setup succeeded. A context
/// whose setup failed is closed before the error is returned.
pub(crate) async fn keep_if_ready(
    context: Box<dyn BrowsingContext>,
    setup: Result<(), AuditError>,
) -> Result<Box<dyn BrowsingContext>, AuditError> {
    match setup {
        Ok(()) => Ok(context),
        Err(e) => {
            if let Err(close_error) = context.close().await {
                ::log::warn!("Failed to close half-opened context: {}", close_error);
            }
            Err(e)
        }
    }
}

/// Owner of the browser for the duration of a run
pub struct Session {
    browser: Box<dyn Browser>,
    navigation_timeout: Duration,
}

impl Session {
    pub fn new(browser: Box<dyn Browser>, navigation_timeout: Duration) -> Self {
        Self {
            browser,
            navigation_timeout,
        }
    }

    pub async fn open_context(
        &self,
        viewport: Viewport,
    ) -> Result<Box<dyn BrowsingContext>, AuditError> {
        ::log::debug!("Opening {}x{} context", viewport.width, viewport.height);
        self.browser.new_context(viewport).await
    }

    /// Close a context. A failed close is logged and never replaces the
    /// outcome of the work done in it.
    pub async fn release(&self, context: Box<dyn BrowsingContext>) {
        match context.close().await {
            Ok(()) => ::log::debug!("Context released"),
            Err(e) => ::log::warn!("Failed to release context: {}", e),
        }
    }

    /// Navigate under the per-navigation timeout
    pub async fn navigate(
        &self,
        context: &mut dyn BrowsingContext,
        url: &Url,
    ) -> Result<u16, AuditError> {
        match tokio::time::timeout(self.navigation_timeout, context.goto(url)).await {
            Ok(result) => result,
            Err(_) => Err(AuditError::NavigationTimeout {
                url: url.to_string(),
                timeout_ms: self.navigation_timeout.as_millis() as u64,
            }),
        }
    }

    /// Release the browser; called once at the end of a run
    pub async fn shutdown(self) {
        match self.browser.close().await {
            Ok(()) => ::log::info!("Browser closed"),
            Err(e) => ::log::warn!("Failed to close browser: {}", e),
        }
    }
}
