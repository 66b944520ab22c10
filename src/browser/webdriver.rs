use super::{Browser, BrowsingContext, CaptureArea, keep_if_ready};
use crate::config::{Viewport, WebDriverConfig};
use crate::errors::AuditError;
use crate::parsers::{LiveMetrics, PageCapture};
use async_trait::async_trait;
use fantoccini::wd::{Capabilities, TimeoutConfiguration, WindowHandle};
use fantoccini::{Client, ClientBuilder};
use serde_json::{Value, json};
use std::time::{Duration, Instant};
use url::Url;

/// Interval between network activity checks
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Quiet period after which the network counts as idle
const IDLE_QUIET: Duration = Duration::from_millis(500);

/// Tallest full-page capture, in CSS pixels
const MAX_CAPTURE_HEIGHT: u32 = 16_384;

const NETWORK_STATE_SCRIPT: &str = r#"
    if (performance.setResourceTimingBufferSize) {
        performance.setResourceTimingBufferSize(100000);
    }
    return [document.readyState, performance.getEntriesByType('resource').length];
"#;

const STATUS_SCRIPT: &str = r#"
    const nav = performance.getEntriesByType('navigation')[0];
    return nav && nav.responseStatus ? nav.responseStatus : 0;
"#;

const INNER_SIZE_SCRIPT: &str = "return [window.innerWidth, window.innerHeight];";

const DOCUMENT_HEIGHT_SCRIPT: &str = r#"
    const body = document.body ? document.body.scrollHeight : 0;
    return Math.max(body, document.documentElement.scrollHeight);
"#;

const LIVE_METRICS_SCRIPT: &str = r#"
    const main = document.querySelector('main');
    return {
        title: document.title || '',
        bodyText: document.body ? document.body.innerText : '',
        mainText: main ? main.innerText : null,
        images: Array.from(document.images).map(img => [img.naturalWidth, img.naturalHeight])
    };
"#;

const CLEAR_STORAGE_SCRIPT: &str = r#"
    try { window.localStorage.clear(); } catch (e) {}
    try { window.sessionStorage.clear(); } catch (e) {}
    return null;
"#;

/// A browser driven over WebDriver. One session is one browser process;
/// contexts are top-level windows of that session.
pub struct WebDriverBrowser {
    client: Client,
    home: WindowHandle,
}

impl WebDriverBrowser {
    /// Start a session on the configured endpoint, falling back to the
    /// alternates in order. Failing all of them is fatal for the run.
    ///
    /// The driver's page-load timeout is set to `navigation_timeout` so an
    /// abandoned load does not hold up the commands queued behind it.
    pub async fn launch(
        config: &WebDriverConfig,
        navigation_timeout: Duration,
    ) -> Result<Self, AuditError> {
        let client = connect_to_webdriver(config).await?;
        client.update_timeouts(timeouts(navigation_timeout)).await?;
        let home = client.window().await?;
        Ok(Self { client, home })
    }
}

fn timeouts(navigation_timeout: Duration) -> TimeoutConfiguration {
    TimeoutConfiguration::new(None, Some(navigation_timeout), None)
}

/// Connects to the WebDriver instance
async fn connect_to_webdriver(config: &WebDriverConfig) -> Result<Client, AuditError> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(capabilities(config.headless));

    let mut endpoints = vec![config.url.as_str()];
    for url in &config.fallback_urls {
        if !endpoints.contains(&url.as_str()) {
            endpoints.push(url);
        }
    }

    let mut last_error = String::from("no endpoints configured");
    for (i, endpoint) in endpoints.iter().enumerate() {
        if i > 0 {
            ::log::info!("Trying fallback WebDriver URL: {}", endpoint);
        }
        match builder.connect(endpoint).await {
            Ok(client) => {
                ::log::info!("Connected to WebDriver at {}", endpoint);
                return Ok(client);
            }
            Err(e) => {
                ::log::debug!("WebDriver at {} refused a session: {}", endpoint, e);
                last_error = e.to_string();
            }
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(AuditError::Launch {
        endpoint: endpoints.join(", "),
        message: last_error,
    })
}

fn capabilities(headless: bool) -> Capabilities {
    let mut args = vec!["--disable-gpu", "--no-sandbox", "--hide-scrollbars"];
    if headless {
        args.push("--headless=new");
    }

    let mut caps = Capabilities::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    caps
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn new_context(&self, viewport: Viewport) -> Result<Box<dyn BrowsingContext>, AuditError> {
        let window = self.client.new_window(false).await?;
        self.client.switch_to_window(window.handle.clone()).await?;

        let context = WebDriverContext {
            client: self.client.clone(),
            handle: window.handle,
            home: self.home.clone(),
            viewport,
        };
        let sized = context.set_viewport(viewport).await;
        keep_if_ready(Box::new(context), sized).await
    }

    async fn close(self: Box<Self>) -> Result<(), AuditError> {
        self.client.close().await?;
        Ok(())
    }
}

/// A top-level window of the shared session.
///
/// Closing it clears web storage for the loaded origin and the cookies
/// WebDriver can reach, which are only those of the current document's
/// domain. Third-party cookies and IndexedDB outlive the window.
struct WebDriverContext {
    client: Client,
    handle: WindowHandle,
    home: WindowHandle,
    viewport: Viewport,
}

impl WebDriverContext {
    async fn eval<T: serde::de::DeserializeOwned>(&self, script: &str) -> Result<T, AuditError> {
        let value: Value = self.client.execute(script, vec![]).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Size the window so its inner area matches `viewport`
    async fn set_viewport(&self, viewport: Viewport) -> Result<(), AuditError> {
        self.client
            .set_window_size(viewport.width, viewport.height)
            .await?;

        let (inner_width, inner_height): (u32, u32) = self.eval(INNER_SIZE_SCRIPT).await?;
        let extra_width = viewport.width.saturating_sub(inner_width);
        let extra_height = viewport.height.saturating_sub(inner_height);
        if extra_width > 0 || extra_height > 0 {
            self.client
                .set_window_size(viewport.width + extra_width, viewport.height + extra_height)
                .await?;
        }
        Ok(())
    }

    /// Wait until the document is complete and no new resource has started
    /// loading for [`IDLE_QUIET`]
    async fn wait_for_network_idle(&self) -> Result<(), AuditError> {
        let mut last_count: Option<u64> = None;
        let mut quiet_since = Instant::now();

        loop {
            let (ready_state, count): (String, u64) = self.eval(NETWORK_STATE_SCRIPT).await?;
            let now = Instant::now();
            if ready_state != "complete" || last_count != Some(count) {
                last_count = Some(count);
                quiet_since = now;
            } else if now.duration_since(quiet_since) >= IDLE_QUIET {
                return Ok(());
            }
            tokio::time::sleep(IDLE_POLL).await;
        }
    }
}

#[async_trait]
impl BrowsingContext for WebDriverContext {
    async fn goto(&mut self, url: &Url) -> Result<u16, AuditError> {
        self.client
            .goto(url.as_str())
            .await
            .map_err(|e| AuditError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        self.wait_for_network_idle().await?;

        let status: u64 = self.eval(STATUS_SCRIPT).await?;
        Ok(u16::try_from(status).unwrap_or(0))
    }

    async fn screenshot(&mut self, area: CaptureArea) -> Result<Vec<u8>, AuditError> {
        match area {
            CaptureArea::Viewport => Ok(self.client.screenshot().await?),
            CaptureArea::FullPage => {
                let height: u32 = self.eval(DOCUMENT_HEIGHT_SCRIPT).await?;
                let full = Viewport::new(
                    self.viewport.width,
                    height.clamp(self.viewport.height, MAX_CAPTURE_HEIGHT),
                );

                self.set_viewport(full).await?;
                let shot = self.client.screenshot().await;
                self.set_viewport(self.viewport).await?;
                Ok(shot?)
            }
        }
    }

    async fn capture(&mut self) -> Result<PageCapture, AuditError> {
        let url = self.client.current_url().await?;
        let html = self.client.source().await?;
        let live: LiveMetrics = self.eval(LIVE_METRICS_SCRIPT).await?;
        Ok(PageCapture {
            url,
            html,
            live: Some(live),
        })
    }

    async fn close(self: Box<Self>) -> Result<(), AuditError> {
        // Storage is per origin and cookies are per profile; wipe both before
        // the window goes away so the next context starts clean.
        if let Err(e) = self.client.execute(CLEAR_STORAGE_SCRIPT, vec![]).await {
            ::log::debug!("Could not clear web storage: {}", e);
        }
        if let Err(e) = self.client.delete_all_cookies().await {
            ::log::debug!("Could not delete cookies: {}", e);
        }

        self.client.switch_to_window(self.handle.clone()).await?;
        self.client.close_window().await?;
        self.client.switch_to_window(self.home.clone()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_load_timeout_follows_navigation_timeout() {
        let timeouts = timeouts(Duration::from_millis(15_000));
        assert_eq!(timeouts.page_load(), Some(Duration::from_millis(15_000)));
        assert_eq!(timeouts.script(), None);
        assert_eq!(timeouts.implicit(), None);
    }

    #[test]
    fn test_headless_flag_controls_args() {
        let args = |caps: &Capabilities| caps["goog:chromeOptions"]["args"].clone();
        assert!(
            args(&capabilities(true))
                .as_array()
                .unwrap()
                .contains(&json!("--headless=new"))
        );
        assert!(
            !args(&capabilities(false))
                .as_array()
                .unwrap()
                .contains(&json!("--headless=new"))
        );
    }
}
