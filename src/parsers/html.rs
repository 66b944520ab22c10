use crate::parsers::text::collapse_whitespace;
use crate::parsers::{PageNode, RenderedPage};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

/// Values only the layout engine knows, read from the live page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LiveMetrics {
    pub title: String,
    /// `document.body.innerText`
    pub body_text: String,
    /// `innerText` of `<main>`, absent when the page has none
    pub main_text: Option<String>,
    /// `[naturalWidth, naturalHeight]` of each image, in document order
    pub images: Vec<(u32, u32)>,
}

/// Everything captured from a loaded page in one round trip
#[derive(Debug, Clone)]
pub struct PageCapture {
    pub url: Url,
    pub html: String,
    pub live: Option<LiveMetrics>,
}

/// A parsed document, optionally backed by live rendering metrics
pub struct DomSnapshot {
    document: Html,
    url: Url,
    live: Option<LiveMetrics>,
}

impl DomSnapshot {
    /// Parse raw HTML; rendered text is approximated from the markup
    pub fn parse(html: &str, url: Url) -> Self {
        Self {
            document: Html::parse_document(html),
            url,
            live: None,
        }
    }

    pub fn from_capture(capture: PageCapture) -> Self {
        Self {
            document: Html::parse_document(&capture.html),
            url: capture.url,
            live: capture.live,
        }
    }

    fn first(&self, selector: &str) -> Option<ElementRef<'_>> {
        let selector = parse_selector(selector)?;
        self.document.select(&selector).next()
    }
}

impl RenderedPage for DomSnapshot {
    type Node<'a> = HtmlNode<'a>;

    fn page_url(&self) -> &Url {
        &self.url
    }

    fn title(&self) -> String {
        if let Some(live) = &self.live {
            return live.title.clone();
        }
        self.first("title")
            .map(|t| collapse_whitespace(&t.text().collect::<String>()))
            .unwrap_or_default()
    }

    fn select(&self, selector: &str) -> Vec<HtmlNode<'_>> {
        match parse_selector(selector) {
            Some(selector) => self.document.select(&selector).map(HtmlNode).collect(),
            None => Vec::new(),
        }
    }

    fn body_text(&self) -> String {
        if let Some(live) = &self.live {
            return live.body_text.clone();
        }
        self.first("body").map(visible_text).unwrap_or_default()
    }

    fn main_text(&self) -> Option<String> {
        if let Some(live) = &self.live {
            return live.main_text.clone();
        }
        self.first("main").map(visible_text)
    }

    fn image_sizes(&self) -> Vec<(u32, u32)> {
        match &self.live {
            Some(live) => live.images.clone(),
            // Nothing is decoded without a renderer
            None => vec![(0, 0); self.select("img").len()],
        }
    }
}

/// An element of a [`DomSnapshot`]
#[derive(Clone, Copy)]
pub struct HtmlNode<'a>(ElementRef<'a>);

impl PageNode for HtmlNode<'_> {
    fn tag_name(&self) -> String {
        self.0.value().name().to_ascii_uppercase()
    }

    fn text(&self) -> String {
        self.0.text().collect::<String>().trim().to_string()
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.0.value().attr(name).map(str::to_string)
    }

    fn within(&self, tags: &[&str]) -> bool {
        self.0
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|el| tags.contains(&el.value().name()))
    }
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(selector) => Some(selector),
        Err(e) => {
            ::log::warn!("Invalid selector {:?}: {:?}", selector, e);
            None
        }
    }
}

/// Text a reader would see: script and style contents skipped, whitespace collapsed
fn visible_text(element: ElementRef<'_>) -> String {
    let text = element
        .descendants()
        .filter(|node| {
            node.parent()
                .and_then(|p| p.value().as_element())
                .is_none_or(|p| !matches!(p.name(), "script" | "style" | "noscript" | "template"))
        })
        .filter_map(|node| node.value().as_text().map(|t| &**t))
        .collect::<Vec<_>>()
        .join(" ");

    collapse_whitespace(&text)
}
