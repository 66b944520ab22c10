pub mod html;
pub mod metadata;
pub mod text;

#[cfg(test)]
mod tests;

pub use html::{DomSnapshot, LiveMetrics, PageCapture};
pub use metadata::extract;

use url::Url;

/// Truncation caps applied by the extractor. Oversize input is cut, never rejected.
pub mod limits {
    /// Characters kept from a link's text
    pub const LINK_TEXT: usize = 100;
    /// Characters kept from a heading's text
    pub const HEADING_TEXT: usize = 300;
    /// Characters kept from an image `src`
    pub const IMAGE_SRC: usize = 200;
    /// Characters kept from a call-to-action's text
    pub const CTA_TEXT: usize = 100;
    /// Characters kept from an element's class list
    pub const CLASSES: usize = 200;
    /// Characters kept from an author element
    pub const AUTHOR_TEXT: usize = 200;
    /// Characters kept from a date element
    pub const DATE_TEXT: usize = 100;
    /// Paragraphs at or under this many characters are ignored
    pub const PARAGRAPH_MIN_CHARS: usize = 20;
    /// Number of paragraph texts sampled
    pub const PARAGRAPH_SAMPLE: usize = 15;
    /// Characters kept from the main content text
    pub const MAIN_CONTENT: usize = 8000;
    /// Characters kept from the body text
    pub const BODY_TEXT: usize = 10_000;
    /// Characters kept from a discovered article link's text
    pub const ARTICLE_TEXT: usize = 200;
}

/// Read-only view of a rendered document.
///
/// The extractor only ever talks to a page through this trait, so it can run
/// against a live browser capture or an in-memory document alike.
pub trait RenderedPage {
    type Node<'a>: PageNode
    where
        Self: 'a;

    /// URL the document was loaded from, after redirects
    fn page_url(&self) -> &Url;

    /// `document.title`
    fn title(&self) -> String;

    /// Elements matching a CSS selector, in document order
    fn select(&self, selector: &str) -> Vec<Self::Node<'_>>;

    /// Rendered text of the body
    fn body_text(&self) -> String;

    /// Rendered text of the `<main>` element, if the page has one
    fn main_text(&self) -> Option<String>;

    /// Intrinsic (width, height) of every `<img>`, in document order
    fn image_sizes(&self) -> Vec<(u32, u32)>;

    /// Resolve a possibly relative reference against the page URL
    fn resolve_url(&self, href: &str) -> Option<Url> {
        self.page_url().join(href).ok()
    }
}

/// One element of a [`RenderedPage`]
pub trait PageNode {
    /// Upper-case tag name, as `Element.tagName` reports it
    fn tag_name(&self) -> String;

    /// Trimmed text content
    fn text(&self) -> String;

    fn attr(&self, name: &str) -> Option<String>;

    /// True if the element sits inside any of the given tags
    fn within(&self, tags: &[&str]) -> bool;
}
