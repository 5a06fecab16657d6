// src/main.rs
mod config;
mod extractors;
mod feed;
mod grouping;
mod normalize;
mod pipeline;
mod storage;
mod utils;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use config::{compile_pattern, Settings};
use feed::UploadOutcome;
use pipeline::{CrawlCsvRow, CrawlOptions, Crawler, SiteSummary};
use storage::StorageManager;
use utils::AppError;

/// Collects NH cooperative branch listings and cleans them into spreadsheets
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl each cooperative site for its branch/office page
    Crawl {
        /// Local JSON site list ([{region, coop, url}]); defaults to the sheet backend
        #[arg(short, long)]
        sites: Option<PathBuf>,

        /// Output directory for the backup, CSV and summary
        #[arg(short, long, default_value = "./output")]
        output_dir: PathBuf,

        /// Skip posting results to the sheet backend
        #[arg(long)]
        no_upload: bool,

        /// Debug mode - save annotated branch pages
        #[arg(short, long)]
        debug: bool,

        /// Skip candidate blocks longer than this many lines
        #[arg(long)]
        max_block_lines: Option<usize>,
    },

    /// Collect places from the keyword search API and group them by cooperative
    Fetch {
        #[arg(long, default_value = "강원도")]
        region: String,

        #[arg(long, default_value = "농협")]
        keyword: String,

        #[arg(short, long, default_value = "./output")]
        output_dir: PathBuf,

        /// Page cap of the search API
        #[arg(long, default_value = "45")]
        max_pages: u32,
    },

    /// Classify, normalize and deduplicate a grouped CSV
    Clean {
        #[arg(short, long, default_value = "./output/branches.csv")]
        input: PathBuf,

        #[arg(short, long, default_value = "./output")]
        output_dir: PathBuf,

        /// Region regex (first capture group is the city/county)
        #[arg(long)]
        region_pattern: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments and settings
    let args = Args::parse();
    tracing::debug!("Starting with args: {:?}", args);
    let mut settings = Settings::load()?;

    match args.command {
        Command::Crawl { sites, output_dir, no_upload, debug, max_block_lines } => {
            let storage = StorageManager::new(&output_dir)?;
            let options = CrawlOptions { max_block_lines, debug };
            run_crawl(&settings, sites, &options, no_upload, &storage).await
        }
        Command::Fetch { region, keyword, output_dir, max_pages } => {
            let storage = StorageManager::new(&output_dir)?;
            let client = feed::build_client(&settings)?;
            let grouped = pipeline::run_fetch(&client, &settings, &region, &keyword, max_pages, &storage).await?;
            tracing::info!("Fetch finished: {} grouped records", grouped.len());
            Ok(())
        }
        Command::Clean { input, output_dir, region_pattern } => {
            if let Some(pattern) = region_pattern {
                settings.patterns.region = compile_pattern("--region-pattern", &pattern)?;
            }
            let storage = StorageManager::new(&output_dir)?;
            pipeline::run_clean(&input, &settings.patterns, &storage)?;
            Ok(())
        }
    }
}

async fn run_crawl(
    settings: &Settings,
    sites_file: Option<PathBuf>,
    options: &CrawlOptions,
    no_upload: bool,
    storage: &StorageManager,
) -> Result<(), AppError> {
    let client = feed::build_client(settings)?;

    // Feed failures are fatal: nothing has been processed yet.
    let sites = match (&sites_file, &settings.sheet_endpoint) {
        (Some(path), _) => feed::load_sites_from_file(path)?,
        (None, Some(endpoint)) => feed::load_sites_from_sheet(&client, endpoint).await?,
        (None, None) => return Err(utils::error::FeedError::MissingSource.into()),
    };
    tracing::info!("Crawling {} sites", sites.len());

    let crawler = Crawler::new(&client, settings, options, storage);
    let outcomes = crawler.crawl(&sites).await;
    let rows = pipeline::rows_from_outcomes(&outcomes, &settings.patterns);

    // Local backup first; the upload below may fail without losing anything.
    storage.save_json("result.json", &rows)?;
    let csv_rows: Vec<CrawlCsvRow> = rows.iter().map(CrawlCsvRow::from).collect();
    storage.save_csv("branches_crawled.csv", &csv_rows)?;

    let summaries: Vec<SiteSummary> = outcomes.iter().map(SiteSummary::from).collect();
    storage.save_json(
        "crawl_summary.json",
        &serde_json::json!({
            "generated_at": chrono::Utc::now().to_rfc3339(),
            "sites": summaries,
            "records": rows.len(),
        }),
    )?;

    match (&settings.sheet_endpoint, no_upload) {
        (Some(endpoint), false) => {
            tracing::info!("Uploading {} records to the sheet backend", rows.len());
            match feed::post_results(&client, endpoint, &rows).await {
                Ok(UploadOutcome::Accepted { count }) => tracing::info!("Upload complete ({} rows)", count),
                Ok(UploadOutcome::Rejected { reason }) => tracing::warn!("Upload rejected: {}", reason),
                Ok(UploadOutcome::Unparsed { body }) => tracing::warn!("Could not parse upload response: {}", body),
                Err(e) => tracing::warn!("Upload failed: {}", e),
            }
        }
        (None, false) => tracing::warn!("SHEET_ENDPOINT not set; skipping upload"),
        (_, true) => tracing::info!("Upload skipped (--no-upload)"),
    }

    let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
    tracing::info!("Processing finished. Sites: {}, Failures: {}, Records: {}", outcomes.len(), failed, rows.len());
    Ok(())
}
