//! Scripted in-memory browser for tests.

use super::{Browser, BrowsingContext, CaptureArea};
use crate::config::Viewport;
use crate::errors::AuditError;
use crate::parsers::PageCapture;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;

/// How the fake answers a navigation
#[derive(Debug, Clone)]
pub enum FakePage {
    Html { status: u16, html: String },
    /// Never finishes loading
    Hang,
    /// Fails immediately with this message
    Fail(String),
}

impl FakePage {
    pub fn ok(html: &str) -> Self {
        FakePage::Html {
            status: 200,
            html: html.to_string(),
        }
    }
}

#[derive(Default)]
struct FakeState {
    /// Responses per URL; successive visits take successive entries, the last repeats
    pages: HashMap<String, Vec<FakePage>>,
    visits: Vec<String>,
    open: usize,
    viewports: Vec<Viewport>,
    failing_screenshot_width: Option<u32>,
    closed: bool,
}

#[derive(Clone, Default)]
pub struct FakeBrowser {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, page: FakePage) -> Self {
        self.with_responses(url, vec![page])
    }

    pub fn with_responses(self, url: &str, pages: Vec<FakePage>) -> Self {
        self.state.lock().unwrap().pages.insert(url.to_string(), pages);
        self
    }

    /// Screenshots taken in contexts of this width fail
    pub fn failing_screenshots_at(self, width: u32) -> Self {
        self.state.lock().unwrap().failing_screenshot_width = Some(width);
        self
    }

    pub fn open_contexts(&self) -> usize {
        self.state.lock().unwrap().open
    }

    pub fn viewports(&self) -> Vec<Viewport> {
        self.state.lock().unwrap().viewports.clone()
    }

    pub fn visits(&self) -> Vec<String> {
        self.state.lock().unwrap().visits.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    fn respond(&self, url: &str) -> FakePage {
        let mut state = self.state.lock().unwrap();
        let seen = state.visits.iter().filter(|v| *v == url).count();
        state.visits.push(url.to_string());
        match state.pages.get(url) {
            Some(pages) if !pages.is_empty() => pages[seen.min(pages.len() - 1)].clone(),
            _ => FakePage::Html {
                status: 404,
                html: "<html><body><h1>Not found</h1></body></html>".to_string(),
            },
        }
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn new_context(&self, viewport: Viewport) -> Result<Box<dyn BrowsingContext>, AuditError> {
        let mut state = self.state.lock().unwrap();
        state.open += 1;
        state.viewports.push(viewport);
        Ok(Box::new(FakeContext {
            browser: self.clone(),
            viewport,
            loaded: None,
        }))
    }

    async fn close(self: Box<Self>) -> Result<(), AuditError> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}

struct FakeContext {
    browser: FakeBrowser,
    viewport: Viewport,
    loaded: Option<(Url, String)>,
}

#[async_trait]
impl BrowsingContext for FakeContext {
    async fn goto(&mut self, url: &Url) -> Result<u16, AuditError> {
        match self.browser.respond(url.as_str()) {
            FakePage::Html { status, html } => {
                self.loaded = Some((url.clone(), html));
                Ok(status)
            }
            FakePage::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            FakePage::Fail(message) => Err(AuditError::Navigation {
                url: url.to_string(),
                message,
            }),
        }
    }

    async fn screenshot(&mut self, area: CaptureArea) -> Result<Vec<u8>, AuditError> {
        let failing = self.browser.state.lock().unwrap().failing_screenshot_width;
        if failing == Some(self.viewport.width) {
            return Err(AuditError::Browser("screenshot capture failed".to_string()));
        }
        match (&self.loaded, area) {
            (None, _) => Err(AuditError::Browser("no document loaded".to_string())),
            (Some(_), CaptureArea::Viewport) => Ok(b"\x89PNG viewport".to_vec()),
            (Some(_), CaptureArea::FullPage) => Ok(b"\x89PNG full".to_vec()),
        }
    }

    async fn capture(&mut self) -> Result<PageCapture, AuditError> {
        match &self.loaded {
            Some((url, html)) => Ok(PageCapture {
                url: url.clone(),
                html: html.clone(),
                live: None,
            }),
            None => Err(AuditError::Browser("no document loaded".to_string())),
        }
    }

    async fn close(self: Box<Self>) -> Result<(), AuditError> {
        self.browser.state.lock().unwrap().open -= 1;
        Ok(())
    }
}
