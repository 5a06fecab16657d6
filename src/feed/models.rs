// src/feed/models.rs
use serde::Deserialize;

use crate::grouping::Place;

/// A cooperative site to crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub region: String,
    pub cooperative_name: String,
    pub base_url: String,
}

/// Entry of the local site list file: `[{"region": .., "coop": .., "url": ..}]`.
#[derive(Debug, Deserialize)]
pub struct LocalSiteEntry {
    #[serde(default)]
    pub region: String,
    pub coop: String,
    pub url: String,
}

impl From<LocalSiteEntry> for Site {
    fn from(entry: LocalSiteEntry) -> Self {
        Site {
            region: entry.region,
            cooperative_name: entry.coop,
            base_url: entry.url,
        }
    }
}

// Column headers of the site sheet.
pub const SHEET_REGION: &str = "지역";
pub const SHEET_COOP: &str = "농·축협";
pub const SHEET_HOMEPAGE: &str = "홈페이지";

/// Converts sheet rows into sites, skipping rows without an http(s) homepage.
pub fn sites_from_sheet_rows(rows: &[serde_json::Value]) -> Vec<Site> {
    let cell = |row: &serde_json::Value, key: &str| -> Option<String> {
        row.get(key)
            .and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.trim().to_string()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
    };

    rows.iter()
        .filter_map(|row| {
            let url = cell(row, SHEET_HOMEPAGE).filter(|u| u.contains("http"))?;
            let region = cell(row, SHEET_REGION).unwrap_or_default();
            let cooperative_name = cell(row, SHEET_COOP)
                .or_else(|| cell(row, SHEET_REGION))
                .unwrap_or_else(|| "Unknown".to_string());
            Some(Site {
                region,
                cooperative_name,
                base_url: url,
            })
        })
        .collect()
}

/// One page of the places keyword search.
#[derive(Debug, Deserialize)]
pub struct PlacesResponse {
    #[serde(default)]
    pub documents: Vec<PlaceDocument>,
    pub meta: Option<PlacesMeta>,
}

#[derive(Debug, Deserialize)]
pub struct PlacesMeta {
    #[serde(default)]
    pub total_count: u64,
}

impl PlacesResponse {
    /// Number of matches the provider reports for the whole query.
    pub fn total_count(&self) -> u64 {
        self.meta.as_ref().map_or(0, |meta| meta.total_count)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceDocument {
    pub place_name: String,
    #[serde(default)]
    pub road_address_name: Option<String>,
    #[serde(default)]
    pub address_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl From<PlaceDocument> for Place {
    fn from(doc: PlaceDocument) -> Self {
        let address = doc
            .road_address_name
            .filter(|a| !a.trim().is_empty())
            .or(doc.address_name)
            .unwrap_or_default();
        Place {
            name: doc.place_name,
            address,
            phone: doc.phone.unwrap_or_default(),
        }
    }
}

/// Body returned by the sheet backend after an upload.
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub ok: bool,
    pub count: Option<u64>,
    pub error: Option<String>,
}

/// How an upload went. None of these abort a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Accepted { count: u64 },
    Rejected { reason: String },
    Unparsed { body: String },
}

impl UploadOutcome {
    /// Interprets a raw response body.
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<UploadResponse>(body) {
            Ok(resp) if resp.ok => UploadOutcome::Accepted { count: resp.count.unwrap_or(0) },
            Ok(resp) => UploadOutcome::Rejected {
                reason: resp.error.unwrap_or_else(|| body.to_string()),
            },
            Err(_) => UploadOutcome::Unparsed { body: body.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sheet_rows_without_homepage_are_dropped() {
        let rows = vec![
            json!({"지역": "춘천시", "농·축협": "춘천농협", "홈페이지": "https://chuncheon.nh.example"}),
            json!({"지역": "원주시", "농·축협": "원주농협", "홈페이지": ""}),
            json!({"지역": "홍천군", "농·축협": "홍천농협", "홈페이지": "준비중"}),
            json!({"지역": "속초시", "홈페이지": "http://sokcho.nh.example"}),
            json!({"홈페이지": "http://unknown.example"}),
        ];
        let sites = sites_from_sheet_rows(&rows);
        assert_eq!(sites.len(), 3);
        assert_eq!(sites[0].cooperative_name, "춘천농협");
        assert_eq!(sites[0].region, "춘천시");
        assert_eq!(sites[1].cooperative_name, "속초시");
        assert_eq!(sites[2].cooperative_name, "Unknown");
    }

    #[test]
    fn place_prefers_road_address() {
        let doc: PlaceDocument = serde_json::from_value(json!({
            "place_name": "강원농협 춘천지점",
            "road_address_name": "강원 춘천시 중앙로 1",
            "address_name": "강원 춘천시 조양동 1",
            "phone": "033-123-4567"
        }))
        .unwrap();
        let place = Place::from(doc);
        assert_eq!(place.address, "강원 춘천시 중앙로 1");
        assert_eq!(place.phone, "033-123-4567");

        let doc: PlaceDocument = serde_json::from_value(json!({
            "place_name": "강원농협 원주지점",
            "road_address_name": "",
            "address_name": "강원 원주시 단구동 2"
        }))
        .unwrap();
        let place = Place::from(doc);
        assert_eq!(place.address, "강원 원주시 단구동 2");
        assert_eq!(place.phone, "");
    }

    #[test]
    fn places_total_count_defaults_to_zero() {
        let page: PlacesResponse =
            serde_json::from_value(json!({"documents": [], "meta": {"total_count": 87, "is_end": false}})).unwrap();
        assert_eq!(page.total_count(), 87);

        let page: PlacesResponse = serde_json::from_value(json!({"documents": []})).unwrap();
        assert_eq!(page.total_count(), 0);
    }

    #[test]
    fn upload_bodies_are_interpreted() {
        assert_eq!(UploadOutcome::from_body(r#"{"ok":true,"count":12}"#), UploadOutcome::Accepted { count: 12 });
        assert_eq!(
            UploadOutcome::from_body(r#"{"error":"sheet missing"}"#),
            UploadOutcome::Rejected { reason: "sheet missing".to_string() }
        );
        assert_eq!(
            UploadOutcome::from_body("<html>Error</html>"),
            UploadOutcome::Unparsed { body: "<html>Error</html>".to_string() }
        );
    }
}
