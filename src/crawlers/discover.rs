use crate::browser::{BrowsingContext, Session};
use crate::config::{AuditConfig, Viewport};
use crate::errors::AuditError;
use crate::filter::{ArticleFilter, ArticleFilterConfig, MatchMode};
use crate::parsers::text::truncate_chars;
use crate::parsers::{DomSnapshot, PageCapture, PageNode, RenderedPage, limits};
use crate::results::ArticleLink;
use std::collections::HashSet;
use url::Url;

/// Finds blog articles linked from index and category pages
pub struct LinkDiscoverer<'a> {
    session: &'a Session,
    viewport: Viewport,
    filter: ArticleFilter,
}

impl<'a> LinkDiscoverer<'a> {
    pub fn new(session: &'a Session, config: &AuditConfig) -> Result<Self, AuditError> {
        let filter_config = ArticleFilterConfig::new(
            config.origin()?,
            &config.discovery.article_prefix,
            &config.resolved_index_urls()?,
        );
        let filter = ArticleFilter::new(filter_config)
            .map_err(|e| AuditError::Config(format!("invalid exclude pattern: {}", e)))?;

        Ok(Self {
            session,
            viewport: config.desktop,
            filter,
        })
    }

    /// Scan every index page in order and return the unique articles found.
    ///
    /// A page that fails to load is skipped. When no link passes the strict
    /// article rule, the links already gathered are re-filtered with the
    /// loose one.
    pub async fn discover(&self, index_urls: &[Url]) -> Vec<ArticleLink> {
        let mut candidates = Vec::new();
        for url in index_urls {
            match self.scan(url).await {
                Ok(found) => {
                    ::log::info!("Found {} links on {}", found.len(), url);
                    candidates.extend(found);
                }
                Err(e) => ::log::warn!("Error discovering from {}: {}", url, e),
            }
        }

        let mut articles = self.select(&candidates, MatchMode::Strict);
        if articles.is_empty() && !candidates.is_empty() {
            ::log::info!("No nested article links found, retrying with the loose rule");
            articles = self.select(&candidates, MatchMode::Loose);
        }

        dedupe_by_url(articles)
    }

    fn select(&self, candidates: &[ArticleLink], mode: MatchMode) -> Vec<ArticleLink> {
        candidates
            .iter()
            .filter(|link| {
                Url::parse(&link.url).is_ok_and(|url| self.filter.is_article(&url, mode))
            })
            .cloned()
            .collect()
    }

    async fn scan(&self, url: &Url) -> Result<Vec<ArticleLink>, AuditError> {
        let mut context = self.session.open_context(self.viewport).await?;
        let loaded = self.load(context.as_mut(), url).await;
        self.session.release(context).await;

        let snapshot = DomSnapshot::from_capture(loaded?);
        Ok(anchor_links(&snapshot))
    }

    async fn load(
        &self,
        context: &mut dyn BrowsingContext,
        url: &Url,
    ) -> Result<PageCapture, AuditError> {
        self.session.navigate(context, url).await?;
        context.capture().await
    }
}

/// Every anchor with a resolvable href, fragment removed, in document order
pub fn anchor_links<P: RenderedPage>(page: &P) -> Vec<ArticleLink> {
    page.select("a[href]")
        .iter()
        .filter_map(|a| {
            let href = a.attr("href")?;
            let url = page.resolve_url(href.trim())?;
            Some(ArticleLink {
                url: ArticleFilter::normalize_url(&url).to_string(),
                text: truncate_chars(&a.text(), limits::ARTICLE_TEXT),
            })
        })
        .collect()
}

/// Keep the first occurrence of every URL, preserving order
pub fn dedupe_by_url(links: Vec<ArticleLink>) -> Vec<ArticleLink> {
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|link| seen.insert(link.url.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{FakeBrowser, FakePage};

    const BLOG: &str = "https://example.com/blog";
    const TAX: &str = "https://example.com/blog/tax";

    fn config() -> AuditConfig {
        let mut config = AuditConfig::new("https://example.com");
        config.navigation_timeout_ms = 100;
        config
    }

    async fn discover(browser: &FakeBrowser) -> Vec<ArticleLink> {
        let config = config();
        let session = Session::new(Box::new(browser.clone()), config.navigation_timeout());
        let discoverer = LinkDiscoverer::new(&session, &config).unwrap();
        discoverer.discover(&config.resolved_index_urls().unwrap()).await
    }

    fn urls(links: &[ArticleLink]) -> Vec<&str> {
        links.iter().map(|l| l.url.as_str()).collect()
    }

    #[tokio::test]
    async fn test_index_and_category_pages_are_excluded() {
        let browser = FakeBrowser::new().with_page(
            BLOG,
            FakePage::ok(
                r#"<body><a href="/blog/post-a">Post A</a><a href="/blog/">Blog</a>
                   <a href="/blog">Blog</a><a href="/blog/category/">Category</a></body>"#,
            ),
        );

        let links = discover(&browser).await;

        assert_eq!(urls(&links), vec!["https://example.com/blog/post-a"]);
        assert_eq!(links[0].text, "Post A");
        assert_eq!(browser.open_contexts(), 0);
    }

    #[tokio::test]
    async fn test_dedupes_in_first_seen_order_across_seeds() {
        let browser = FakeBrowser::new()
            .with_page(
                BLOG,
                FakePage::ok(
                    r#"<a href="/blog/b">B first</a><a href="/blog/a">A</a><a href="/blog/b#top">B again</a>"#,
                ),
            )
            .with_page(
                TAX,
                FakePage::ok(r#"<a href="/blog/c">C</a><a href="/blog/a">A again</a>"#),
            );

        let links = discover(&browser).await;

        assert_eq!(
            urls(&links),
            vec![
                "https://example.com/blog/b",
                "https://example.com/blog/a",
                "https://example.com/blog/c",
            ]
        );
        assert_eq!(links[0].text, "B first");
        assert_eq!(links[1].text, "A");
    }

    #[tokio::test]
    async fn test_failed_seed_does_not_stop_discovery() {
        let browser = FakeBrowser::new()
            .with_page(BLOG, FakePage::Hang)
            .with_page(TAX, FakePage::ok(r#"<a href="/blog/tax/deductions">Deductions</a>"#));

        let links = discover(&browser).await;

        assert_eq!(urls(&links), vec!["https://example.com/blog/tax/deductions"]);
        assert_eq!(browser.open_contexts(), 0);
    }

    #[tokio::test]
    async fn test_loose_fallback_when_strict_finds_nothing() {
        let browser = FakeBrowser::new().with_page(
            BLOG,
            FakePage::ok(
                r#"<a href="/blog/">Home</a><a href="/blog/guides/">Guides</a><a href="/about">About</a>"#,
            ),
        );

        let links = discover(&browser).await;

        assert_eq!(urls(&links), vec!["https://example.com/blog/guides/"]);
    }

    #[tokio::test]
    async fn test_every_seed_failing_yields_nothing() {
        let browser = FakeBrowser::new()
            .with_page(BLOG, FakePage::Fail("refused".to_string()))
            .with_page(TAX, FakePage::Fail("refused".to_string()));

        assert!(discover(&browser).await.is_empty());
        assert_eq!(browser.open_contexts(), 0);
    }

    #[test]
    fn test_anchor_links_truncates_text() {
        let long = "t".repeat(500);
        let page = DomSnapshot::parse(
            &format!(r#"<a href="/blog/x">{long}</a><a>no href</a>"#),
            Url::parse(BLOG).unwrap(),
        );
        let links = anchor_links(&page);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].text.chars().count(), limits::ARTICLE_TEXT);
    }

    #[test]
    fn test_dedupe_by_url() {
        let link = |url: &str, text: &str| ArticleLink {
            url: url.to_string(),
            text: text.to_string(),
        };
        let unique = dedupe_by_url(vec![link("a", "1"), link("b", "2"), link("a", "3")]);
        assert_eq!(unique, vec![link("a", "1"), link("b", "2")]);
    }
}
