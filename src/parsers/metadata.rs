//! SEO metadata extraction over a [`RenderedPage`].
//!
//! Extraction never fails: missing elements produce empty values, malformed
//! JSON-LD blocks are skipped one by one and every text or list field is cut
//! to the caps in [`limits`].

use crate::parsers::limits;
use crate::parsers::text::{contains_any, truncate_chars, word_count};
use crate::parsers::{PageNode, RenderedPage};
use crate::results::{
    ActionLink, CtaInfo, DateInfo, ExtractedMetadata, ImageInfo, LinkInfo, TrustSignal,
};
use serde_json::Value;
use std::collections::HashSet;
use url::Url;

const NAV_LANDMARKS: &[&str] = &["nav", "header", "footer"];

const CTA_SELECTOR: &str = r#"button, a.btn, a[class*="btn"], a[class*="button"], a[class*="cta"], a[class*="CTA"], [role="button"]"#;

const AUTHOR_SELECTOR: &str = r#"[class*="author"], [rel="author"], [itemprop="author"], .author, .by-line, .byline"#;

const DATE_SELECTOR: &str = r#"time, [datetime], [class*="date"], [class*="publish"], [itemprop="datePublished"], [itemprop="dateModified"]"#;

/// Lower-case words that mark an anchor as an action link
const ACTION_WORDS: &[&str] = &[
    "start",
    "sign up",
    "get",
    "try",
    "free",
    "register",
    "learn more",
    "see",
    "explore",
];

/// Extract the SEO snapshot of `page`; links are classified against `origin`
pub fn extract<P: RenderedPage>(page: &P, origin: &Url) -> ExtractedMetadata {
    let body_text = page.body_text();
    let (internal_links, external_links) = classify_links(page, origin);
    let (paragraphs, paragraph_texts) = paragraphs(page);

    ExtractedMetadata {
        title: page.title(),
        meta_desc: meta_content(page, r#"meta[name="description"]"#),
        meta_keywords: meta_content(page, r#"meta[name="keywords"]"#),
        canonical: canonical(page),
        og_title: meta_content(page, r#"meta[property="og:title"]"#),
        og_desc: meta_content(page, r#"meta[property="og:description"]"#),
        og_image: meta_content(page, r#"meta[property="og:image"]"#),
        og_type: meta_content(page, r#"meta[property="og:type"]"#),
        twitter_card: meta_content(page, r#"meta[name="twitter:card"]"#),
        robots: meta_content(page, r#"meta[name="robots"]"#),
        h1s: headings(page, "h1"),
        h2s: headings(page, "h2"),
        h3s: headings(page, "h3"),
        h4s: headings(page, "h4"),
        internal_links,
        external_links,
        word_count: word_count(&body_text),
        images: images(page),
        schemas: structured_data(page),
        ctas: ctas(page),
        action_links: action_links(page),
        author_elements: page
            .select(AUTHOR_SELECTOR)
            .iter()
            .map(|n| truncate_chars(&n.text(), limits::AUTHOR_TEXT))
            .collect(),
        date_elements: page
            .select(DATE_SELECTOR)
            .iter()
            .map(|n| DateInfo {
                text: truncate_chars(&n.text(), limits::DATE_TEXT),
                datetime: n.attr("datetime").unwrap_or_default(),
            })
            .collect(),
        paragraphs,
        paragraph_texts,
        lists: page.select("ul, ol").len(),
        list_items: page.select("li").len(),
        trust_signals: trust_signals(&body_text),
        main_content: truncate_chars(
            &page.main_text().unwrap_or_else(|| body_text.clone()),
            limits::MAIN_CONTENT,
        ),
        body_text: truncate_chars(&body_text, limits::BODY_TEXT),
    }
}

/// Parse one embedded JSON block, or `None` if it is malformed
pub fn parse_or_skip(raw: &str) -> Option<Value> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            ::log::debug!("Skipping malformed JSON-LD block: {}", e);
            None
        }
    }
}

/// Categories whose keywords appear in the body text, in reporting order
pub fn trust_signals(body_text: &str) -> Vec<TrustSignal> {
    let lower = body_text.to_lowercase();
    TrustSignal::ALL
        .into_iter()
        .filter(|signal| contains_any(&lower, signal.keywords()))
        .collect()
}

/// True if a link's text reads like a call to action
pub fn is_action_text(text: &str) -> bool {
    contains_any(&text.trim().to_lowercase(), ACTION_WORDS)
}

fn meta_content<P: RenderedPage>(page: &P, selector: &str) -> String {
    page.select(selector)
        .first()
        .and_then(|n| n.attr("content"))
        .unwrap_or_default()
}

fn canonical<P: RenderedPage>(page: &P) -> String {
    page.select(r#"link[rel="canonical"]"#)
        .first()
        .and_then(|n| n.attr("href"))
        .and_then(|href| page.resolve_url(&href))
        .map(String::from)
        .unwrap_or_default()
}

fn headings<P: RenderedPage>(page: &P, tag: &str) -> Vec<String> {
    page.select(tag)
        .iter()
        .map(|h| truncate_chars(&h.text(), limits::HEADING_TEXT))
        .collect()
}

/// Split the page's anchors into internal and external links, one entry per
/// resolved href (the first anchor wins).
///
/// Internal: root-relative, or resolving to the target origin. External: an
/// absolute http(s) URL on another origin. Anything else is in neither list.
fn classify_links<P: RenderedPage>(page: &P, origin: &Url) -> (Vec<LinkInfo>, Vec<LinkInfo>) {
    let origin = origin.origin();
    let mut seen = HashSet::new();
    let mut internal = Vec::new();
    let mut external = Vec::new();

    for anchor in page.select("a") {
        let Some(raw) = anchor.attr("href") else {
            continue;
        };
        let href = raw.trim();
        let Some(resolved) = page.resolve_url(href) else {
            continue;
        };

        let root_relative = href.starts_with('/') && !href.starts_with("//");
        let same_origin = resolved.origin() == origin;
        let is_web = matches!(resolved.scheme(), "http" | "https");
        if !root_relative && !is_web {
            continue;
        }
        if !seen.insert(resolved.to_string()) {
            continue;
        }

        let rel = anchor.attr("rel").unwrap_or_default().to_lowercase();
        let link = LinkInfo {
            href: resolved.to_string(),
            text: truncate_chars(&anchor.text(), limits::LINK_TEXT),
            is_nav: anchor.within(NAV_LANDMARKS),
            has_nofollow: rel.split_whitespace().any(|r| r == "nofollow"),
            has_target: anchor.attr("target").as_deref() == Some("_blank"),
        };

        if root_relative || same_origin {
            internal.push(link);
        } else {
            external.push(link);
        }
    }

    (internal, external)
}

fn images<P: RenderedPage>(page: &P) -> Vec<ImageInfo> {
    let sizes = page.image_sizes();
    page.select("img")
        .iter()
        .enumerate()
        .map(|(i, img)| {
            let src = img
                .attr("src")
                .map(|s| page.resolve_url(&s).map(String::from).unwrap_or(s))
                .unwrap_or_default();
            let alt = img.attr("alt").unwrap_or_default();
            let (width, height) = sizes.get(i).copied().unwrap_or((0, 0));
            ImageInfo {
                src: truncate_chars(&src, limits::IMAGE_SRC),
                has_alt: !alt.is_empty(),
                alt,
                width,
                height,
            }
        })
        .collect()
}

fn structured_data<P: RenderedPage>(page: &P) -> Vec<Value> {
    page.select(r#"script[type="application/ld+json"]"#)
        .iter()
        .filter_map(|block| parse_or_skip(&block.text()))
        .collect()
}

fn link_href<P: RenderedPage>(page: &P, href: Option<String>) -> String {
    href.and_then(|href| page.resolve_url(href.trim()))
        .map(String::from)
        .unwrap_or_default()
}

fn ctas<P: RenderedPage>(page: &P) -> Vec<CtaInfo> {
    page.select(CTA_SELECTOR)
        .iter()
        .map(|el| {
            let tag = el.tag_name();
            let href = if tag == "A" || tag == "AREA" {
                link_href(page, el.attr("href"))
            } else {
                String::new()
            };
            CtaInfo {
                text: truncate_chars(&el.text(), limits::CTA_TEXT),
                tag,
                href,
                classes: truncate_chars(&el.attr("class").unwrap_or_default(), limits::CLASSES),
            }
        })
        .collect()
}

fn action_links<P: RenderedPage>(page: &P) -> Vec<ActionLink> {
    page.select("a")
        .iter()
        .filter(|a| is_action_text(&a.text()))
        .map(|a| ActionLink {
            text: truncate_chars(&a.text(), limits::LINK_TEXT),
            href: link_href(page, a.attr("href")),
            classes: truncate_chars(&a.attr("class").unwrap_or_default(), limits::CLASSES),
        })
        .collect()
}

/// Count of substantial paragraphs and a sample of their texts
fn paragraphs<P: RenderedPage>(page: &P) -> (usize, Vec<String>) {
    let texts: Vec<String> = page
        .select("p")
        .iter()
        .map(|p| p.text())
        .filter(|t| t.chars().count() > limits::PARAGRAPH_MIN_CHARS)
        .collect();
    let count = texts.len();
    (
        count,
        texts.into_iter().take(limits::PARAGRAPH_SAMPLE).collect(),
    )
}
