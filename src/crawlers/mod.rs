pub mod auditor;
pub mod crawl;
pub mod discover;

pub use auditor::PageAuditor;
pub use crawl::{CrawlReport, Crawler};
pub use discover::LinkDiscoverer;
