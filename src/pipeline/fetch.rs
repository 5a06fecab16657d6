// src/pipeline/fetch.rs
//! Places-search path: every place for a region keyword, grouped under its cooperative.

use crate::config::Settings;
use crate::feed::PlacesClient;
use crate::grouping::{group_places, GroupedRecord};
use crate::storage::StorageManager;
use crate::utils::AppError;

pub const GROUPED_CSV: &str = "branches.csv";

/// Searches `"<region> <keyword>"`, groups the places and writes the grouped CSV.
pub async fn run_fetch(
    client: &reqwest::Client,
    settings: &Settings,
    region: &str,
    keyword: &str,
    max_pages: u32,
    storage: &StorageManager,
) -> Result<Vec<GroupedRecord>, AppError> {
    let api_key = settings.require_kakao_key()?;
    let places_client = PlacesClient::new(client, &settings.kakao_base_url, api_key, max_pages);

    tracing::info!("Searching places for {:?} {:?}", region, keyword);
    let places = places_client.fetch_all(region, keyword).await?;
    tracing::info!("{} places collected", places.len());

    let grouped = group_places(
        &places,
        &settings.patterns.coop_marker,
        &settings.patterns.main_office_label,
    );
    storage.save_csv(GROUPED_CSV, &grouped)?;
    Ok(grouped)
}
