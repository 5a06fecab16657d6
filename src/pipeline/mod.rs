// src/pipeline/mod.rs
pub mod clean;
pub mod crawl;
pub mod fetch;

pub use clean::run_clean;
pub use crawl::{rows_from_outcomes, CrawlCsvRow, CrawlOptions, Crawler, SiteSummary};
pub use fetch::run_fetch;
