// src/pipeline/crawl.rs
//! Site crawl: base page → branch link → branch page → blocks → records.

use reqwest::Url;
use scraper::Html;
use serde::Serialize;

use crate::config::{Patterns, Settings};
use crate::extractors::record::{BRANCH_NAME_RE, FAX_RE, TEL_RE};
use crate::extractors::{anchors_in, parse_branch_block, resolve_branch_link, BlockCollector, BranchRecord};
use crate::feed::{fetch_page, Site};
use crate::normalize::{dedup, extract_region, normalize_optional_phone, DedupKey};
use crate::storage::StorageManager;
use crate::utils::error::SiteError;
use crate::utils::html_debug::{create_debug_html, Highlight};

#[derive(Debug, Clone, Default)]
pub struct CrawlOptions {
    pub max_block_lines: Option<usize>,
    pub debug: bool,
}

/// Result of processing one site. Exactly one of `records`/`error` is meaningful.
#[derive(Debug)]
pub struct SiteOutcome {
    pub site: Site,
    pub branch_url: Option<Url>,
    pub records: Vec<BranchRecord>,
    pub error: Option<SiteError>,
}

/// One crawled branch as uploaded to the sheet backend and kept in the local backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlRow {
    pub region: String,
    pub coop: String,
    pub name: Option<String>,
    pub address: Option<String>,
    pub tel: Option<String>,
    pub fax: Option<String>,
    pub raw: Vec<String>,
}

/// Flat CSV form of a [`CrawlRow`].
#[derive(Debug, Serialize)]
pub struct CrawlCsvRow<'a> {
    pub region: &'a str,
    pub coop: &'a str,
    pub name: Option<&'a str>,
    pub address: Option<&'a str>,
    pub tel: Option<&'a str>,
    pub fax: Option<&'a str>,
    pub raw: String,
}

impl<'a> From<&'a CrawlRow> for CrawlCsvRow<'a> {
    fn from(row: &'a CrawlRow) -> Self {
        CrawlCsvRow {
            region: &row.region,
            coop: &row.coop,
            name: row.name.as_deref(),
            address: row.address.as_deref(),
            tel: row.tel.as_deref(),
            fax: row.fax.as_deref(),
            raw: row.raw.join(" / "),
        }
    }
}

impl DedupKey for CrawlRow {
    fn main_key(&self) -> &str {
        &self.coop
    }

    // Rows without an address fall back to their name so they are not all merged together.
    fn address_key(&self) -> &str {
        self.address
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or_default()
    }

    // Crawled rows carry no sub label. The first (most specific) block for a key wins,
    // including over a wrapper `div` that repeats the main office's name and address.
    fn is_main_office(&self, _main_office_label: &str) -> bool {
        false
    }
}

/// Per-site summary written next to the backup.
#[derive(Debug, Serialize)]
pub struct SiteSummary {
    pub coop: String,
    pub url: String,
    pub branch_url: Option<String>,
    pub records: usize,
    pub error: Option<String>,
}

impl From<&SiteOutcome> for SiteSummary {
    fn from(outcome: &SiteOutcome) -> Self {
        SiteSummary {
            coop: outcome.site.cooperative_name.clone(),
            url: outcome.site.base_url.clone(),
            branch_url: outcome.branch_url.as_ref().map(Url::to_string),
            records: outcome.records.len(),
            error: outcome.error.as_ref().map(ToString::to_string),
        }
    }
}

pub struct Crawler<'a> {
    client: &'a reqwest::Client,
    settings: &'a Settings,
    collector: BlockCollector,
    debug_storage: Option<&'a StorageManager>,
}

impl<'a> Crawler<'a> {
    pub fn new(client: &'a reqwest::Client, settings: &'a Settings, options: &CrawlOptions, storage: &'a StorageManager) -> Self {
        Self {
            client,
            settings,
            collector: BlockCollector::new(options.max_block_lines),
            debug_storage: options.debug.then_some(storage),
        }
    }

    /// Processes sites one after another. A failing site is recorded and the crawl moves on.
    pub async fn crawl(&self, sites: &[Site]) -> Vec<SiteOutcome> {
        let mut outcomes = Vec::with_capacity(sites.len());
        for site in sites {
            outcomes.push(self.scrape_site(site).await);
        }

        let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
        tracing::info!("Crawl finished. Sites: {}, Failures: {}", outcomes.len(), failed);
        outcomes
    }

    pub async fn scrape_site(&self, site: &Site) -> SiteOutcome {
        tracing::info!("[{}] Loading {}", site.cooperative_name, site.base_url);
        match self.try_scrape(site).await {
            Ok((branch_url, records)) => {
                tracing::info!("[{}] {} records from {}", site.cooperative_name, records.len(), branch_url);
                SiteOutcome {
                    site: site.clone(),
                    branch_url: Some(branch_url),
                    records,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!("[{}] {}", site.cooperative_name, e);
                SiteOutcome {
                    site: site.clone(),
                    branch_url: None,
                    records: Vec::new(),
                    error: Some(e),
                }
            }
        }
    }

    async fn try_scrape(&self, site: &Site) -> Result<(Url, Vec<BranchRecord>), SiteError> {
        let delay = self.settings.request_delay_ms;
        let home = fetch_page(self.client, &site.base_url, delay).await?;

        let branch_url = {
            let document = Html::parse_document(&home.html);
            resolve_branch_link(&anchors_in(&document), &home.url, &self.settings.patterns.sub_index)
        }
        .ok_or_else(|| SiteError::LinkNotFound {
            url: home.url.to_string(),
        })?;
        tracing::debug!("[{}] Branch page: {}", site.cooperative_name, branch_url);

        let page = fetch_page(self.client, branch_url.as_str(), delay)
            .await
            .map_err(|e| match e {
                SiteError::Navigation { url, reason } => SiteError::Scrape { url, reason },
                other => other,
            })?;

        if let Some(storage) = self.debug_storage {
            let path = storage.debug_path(&site.cooperative_name);
            let patterns = [
                (&*BRANCH_NAME_RE, Highlight::BranchKeyword),
                (&*TEL_RE, Highlight::Phone),
                (&*FAX_RE, Highlight::Fax),
            ];
            if let Err(e) = create_debug_html(&page.html, &path, &patterns) {
                tracing::warn!("Failed to create debug HTML: {}", e);
            }
        }

        let records = self
            .collector
            .collect_from_html(&page.html)
            .iter()
            .map(|block| parse_branch_block(block))
            .collect();

        Ok((branch_url, records))
    }
}

/// Folds site outcomes into normalized, deduplicated rows.
pub fn rows_from_outcomes(outcomes: &[SiteOutcome], patterns: &Patterns) -> Vec<CrawlRow> {
    let rows: Vec<CrawlRow> = outcomes
        .iter()
        .flat_map(|outcome| {
            outcome.records.iter().map(move |record| {
                let region = if outcome.site.region.trim().is_empty() {
                    record
                        .address
                        .as_deref()
                        .map(|a| extract_region(a, &patterns.region))
                        .unwrap_or_default()
                } else {
                    outcome.site.region.clone()
                };
                CrawlRow {
                    region,
                    coop: outcome.site.cooperative_name.clone(),
                    name: record.name.clone(),
                    address: record.address.clone(),
                    tel: normalize_optional_phone(record.tel.as_deref()),
                    fax: normalize_optional_phone(record.fax.as_deref()),
                    raw: record.raw.clone(),
                }
            })
        })
        .collect();

    dedup(rows, &patterns.main_office_label)
}
