use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "seo-audit")]
#[command(about = "Audits on-page SEO signals of a site through a headless browser")]
#[command(version)]
pub struct Args {
    /// JSON configuration file (seeds, viewports, discovery, WebDriver)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Origin of the audited site; relative seed URLs resolve against it
    #[arg(short, long)]
    pub base_url: Option<String>,

    /// Directory for screenshots, blog_articles.json and seo_audit_data.json
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// WebDriver endpoint (WEBDRIVER_URL takes precedence)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Maximum number of discovered articles to audit
    #[arg(long)]
    pub article_limit: Option<usize>,

    /// Per-navigation timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}
