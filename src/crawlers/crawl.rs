use crate::browser::{Browser, Session};
use crate::config::AuditConfig;
use crate::crawlers::{LinkDiscoverer, PageAuditor};
use crate::errors::AuditError;
use crate::results::{ArticleLink, AuditResult, PageTarget};
use crate::utils::article_name;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const ARTICLES_FILE: &str = "blog_articles.json";
pub const RESULTS_FILE: &str = "seo_audit_data.json";

/// What a finished run produced
#[derive(Debug)]
pub struct CrawlReport {
    /// Unique articles, in discovery order
    pub articles: Vec<ArticleLink>,
    /// One result per audited target: seeds first, then articles
    pub results: Vec<AuditResult>,
    pub articles_path: PathBuf,
    pub results_path: PathBuf,
}

/// Runs the audit: seed pages, article discovery, a capped set of articles,
/// then persistence. Targets are processed one at a time.
pub struct Crawler {
    config: AuditConfig,
    session: Session,
}

impl Crawler {
    pub fn new(config: AuditConfig, browser: Box<dyn Browser>) -> Self {
        let session = Session::new(browser, config.navigation_timeout());
        Self { config, session }
    }

    /// Run to completion and release the browser, whatever the outcome
    pub async fn run(self) -> Result<CrawlReport, AuditError> {
        let outcome = self.crawl().await;
        self.session.shutdown().await;
        outcome
    }

    async fn crawl(&self) -> Result<CrawlReport, AuditError> {
        let dir = &self.config.output_dir;
        std::fs::create_dir_all(dir).map_err(|e| AuditError::Persist {
            path: dir.clone(),
            source: e,
        })?;

        let auditor = PageAuditor::new(&self.session, &self.config)?;
        let mut results = Vec::new();

        for target in self.config.resolved_seeds()? {
            ::log::info!("Auditing: {}", target.url);
            results.push(auditor.audit(&target).await);
        }

        ::log::info!("Discovering blog articles...");
        let discoverer = LinkDiscoverer::new(&self.session, &self.config)?;
        let articles = discoverer
            .discover(&self.config.resolved_index_urls()?)
            .await;
        ::log::info!("Found {} unique blog article links", articles.len());

        let articles_path = dir.join(ARTICLES_FILE);
        write_json(&articles_path, &articles)?;

        let discovery = &self.config.discovery;
        for target in article_targets(&articles, &discovery.article_prefix, discovery.article_limit) {
            ::log::info!("Auditing blog article: {}", target.url);
            results.push(auditor.audit(&target).await);
        }

        let results_path = dir.join(RESULTS_FILE);
        write_json(&results_path, &results)?;
        ::log::info!("Audit complete. Data saved to {}", results_path.display());

        Ok(CrawlReport {
            articles,
            results,
            articles_path,
            results_path,
        })
    }
}

/// Targets for the first `limit` articles, named after their final path segment
pub fn article_targets(articles: &[ArticleLink], prefix: &str, limit: usize) -> Vec<PageTarget> {
    articles
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, article)| PageTarget::new(&article.url, &article_name(prefix, &article.url, i)))
        .collect()
}

/// Write `value` as pretty-printed JSON, replacing any previous file
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), AuditError> {
    let persist_error = |source: std::io::Error| AuditError::Persist {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(persist_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush().map_err(persist_error)?;
    Ok(())
}
