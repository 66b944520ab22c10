use regex::Regex;
use url::Url;

/// How strictly a link must look like an article
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// A named page under the prefix: not a listing (trailing slash), not an index page
    Strict,
    /// Anything under the prefix that is longer than the prefix itself
    Loose,
}

/// Configuration for article link filtering
#[derive(Debug, Clone)]
pub struct ArticleFilterConfig {
    /// Only links on this origin are considered
    pub origin: Url,

    /// Path prefix articles live under, e.g. `/blog/`
    pub article_prefix: String,

    /// Paths of the index pages being scanned; never articles themselves
    pub index_paths: Vec<String>,

    /// Regex patterns for URLs to exclude
    pub exclude_patterns: Vec<String>,
}

impl ArticleFilterConfig {
    pub fn new(origin: Url, article_prefix: &str, index_urls: &[Url]) -> Self {
        Self {
            origin,
            article_prefix: article_prefix.to_string(),
            index_paths: index_urls.iter().map(|u| u.path().to_string()).collect(),
            exclude_patterns: vec![
                // Assets are never articles
                r"(?i)\.(jpg|jpeg|png|gif|webp|css|js|ico|svg|woff|woff2|ttf|eot|pdf|xml|rss)$"
                    .to_string(),
            ],
        }
    }
}

/// Decides which discovered links are blog articles
#[derive(Debug)]
pub struct ArticleFilter {
    config: ArticleFilterConfig,
    exclude_regexes: Vec<Regex>,
}

impl ArticleFilter {
    /// Create a new article filter from configuration
    pub fn new(config: ArticleFilterConfig) -> Result<Self, regex::Error> {
        let mut exclude_regexes = Vec::with_capacity(config.exclude_patterns.len());
        for pattern in &config.exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            config,
            exclude_regexes,
        })
    }

    /// Determine if a URL is an article under the given mode
    pub fn is_article(&self, url: &Url, mode: MatchMode) -> bool {
        if url.origin() != self.config.origin.origin() {
            return false;
        }

        let url_str = url.as_str();
        if self.exclude_regexes.iter().any(|r| r.is_match(url_str)) {
            return false;
        }

        let prefix = self.config.article_prefix.as_str();
        let path = url.path();
        let Some(remainder) = path.strip_prefix(prefix) else {
            return false;
        };

        match mode {
            MatchMode::Strict => {
                !remainder.trim_matches('/').is_empty()
                    && !path.ends_with('/')
                    && !self.is_index_page(path)
            }
            MatchMode::Loose => path.len() > prefix.len(),
        }
    }

    fn is_index_page(&self, path: &str) -> bool {
        let path = path.trim_end_matches('/');
        self.config
            .index_paths
            .iter()
            .any(|index| index.trim_end_matches('/') == path)
    }

    /// Create a normalized version of the URL (e.g., removing fragments)
    pub fn normalize_url(url: &Url) -> Url {
        let mut normalized = url.clone();
        normalized.set_fragment(None);
        normalized
    }
}
