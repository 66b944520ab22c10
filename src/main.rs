use clap::Parser;
use seo_audit::{AuditError, CrawlReport, SeoAudit};

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    let audit = match build_audit(&args) {
        Ok(audit) => audit,
        Err(e) => {
            ::log::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let output_dir = audit.config().output_dir.clone();
    match audit.run().await {
        Ok(report) => print_summary(&report, &output_dir),
        Err(e) => {
            ::log::error!("Audit aborted: {}", e);
            if e.is_fatal() {
                println!("Note: auditing requires a WebDriver server (e.g., ChromeDriver).");
                println!(
                    "Set WEBDRIVER_URL environment variable if not using the default http://localhost:4444"
                );
            }
            std::process::exit(1);
        }
    }
}

/// Apply the config file, then individual command-line overrides
fn build_audit(args: &Args) -> Result<SeoAudit, AuditError> {
    let mut audit = SeoAudit::new("http://localhost:8000/");
    if let Some(path) = &args.config {
        audit = audit.with_config_file(path)?;
    }
    if let Some(base_url) = &args.base_url {
        audit = audit.with_base_url(base_url);
    }
    if let Some(dir) = &args.output_dir {
        audit = audit.with_output_dir(dir.clone());
    }
    if let Some(url) = &args.webdriver_url {
        audit = audit.with_webdriver_url(url);
    }
    if let Some(limit) = args.article_limit {
        audit = audit.with_article_limit(limit);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        audit = audit.with_navigation_timeout(timeout_ms);
    }
    Ok(audit)
}

fn print_summary(report: &CrawlReport, output_dir: &std::path::Path) {
    println!("Found {} unique blog article links", report.articles.len());
    for article in report.articles.iter().take(10) {
        let text: String = article.text.chars().take(80).collect();
        println!("  - {}: {}", article.url, text);
    }

    println!("\nAudit complete. Data saved to {}", report.results_path.display());
    println!("Screenshots saved to {}/", output_dir.display());

    for result in &report.results {
        println!("  {}", result.summary_line());
    }
}
