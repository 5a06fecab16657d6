// src/feed/places.rs
use reqwest::header;

use crate::feed::models::PlacesResponse;
use crate::grouping::Place;
use crate::utils::error::FeedError;

const KEYWORD_SEARCH_PATH: &str = "/v2/local/search/keyword.json";

/// Paged keyword search against the places API.
pub struct PlacesClient<'a> {
    client: &'a reqwest::Client,
    base_url: String,
    api_key: String,
    max_pages: u32,
}

impl<'a> PlacesClient<'a> {
    pub fn new(client: &'a reqwest::Client, base_url: &str, api_key: &str, max_pages: u32) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            max_pages,
        }
    }

    /// Fetches a single result page (1-based).
    pub async fn search_page(&self, query: &str, page: u32) -> Result<PlacesResponse, FeedError> {
        let url = format!("{}{}", self.base_url, KEYWORD_SEARCH_PATH);
        let page_param = page.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[("query", query), ("page", page_param.as_str())])
            .header(header::AUTHORIZATION, format!("KakaoAK {}", self.api_key))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Places search returned {} for page {}", status, page);
            return Err(FeedError::Http { status, url });
        }

        response
            .json::<PlacesResponse>()
            .await
            .map_err(|e| FeedError::Parse(format!("places page {}: {}", page, e)))
    }

    /// Collects every place for `"<region> <keyword>"`, stopping at the first empty page
    /// (or the page cap).
    pub async fn fetch_all(&self, region: &str, keyword: &str) -> Result<Vec<Place>, FeedError> {
        let query = format!("{} {}", region, keyword).trim().to_string();
        let mut places = Vec::new();

        for page in 1..=self.max_pages {
            let response = self.search_page(&query, page).await?;
            if page == 1 {
                tracing::info!("Provider reports {} matches for {:?}", response.total_count(), query);
            }
            if response.documents.is_empty() {
                tracing::debug!("Page {} is empty; stopping", page);
                break;
            }

            tracing::info!("Page {} collected ({} places)", page, response.documents.len());
            places.extend(response.documents.into_iter().map(Place::from));

            if page == self.max_pages {
                tracing::warn!("Stopped at page cap {} for query {:?}", self.max_pages, query);
            }
        }

        tracing::info!("Collected {} places for {:?}", places.len(), query);
        Ok(places)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header as header_eq, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn doc(name: &str) -> serde_json::Value {
        json!({
            "place_name": name,
            "road_address_name": "강원 춘천시 중앙로 1",
            "address_name": "강원 춘천시 조양동 1",
            "phone": "033-123-4567"
        })
    }

    fn page_body(docs: Vec<serde_json::Value>) -> serde_json::Value {
        let total = docs.len();
        json!({"documents": docs, "meta": {"total_count": total}})
    }

    #[tokio::test]
    async fn empty_first_page_yields_no_places() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(KEYWORD_SEARCH_PATH))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![])))
            .expect(1)
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let client = PlacesClient::new(&http, &server.uri(), "test-key", 45);
        let places = tokio_test::assert_ok!(client.fetch_all("강원도", "농협").await);
        assert!(places.is_empty());
    }

    #[tokio::test]
    async fn pages_are_followed_until_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(KEYWORD_SEARCH_PATH))
            .and(query_param("query", "강원도 농협"))
            .and(query_param("page", "1"))
            .and(header_eq("Authorization", "KakaoAK test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![doc("강원농협 춘천지점"), doc("강원농협 원주지점")])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(KEYWORD_SEARCH_PATH))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![doc("홍천농협")])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(KEYWORD_SEARCH_PATH))
            .and(query_param("page", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![])))
            .expect(1)
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let client = PlacesClient::new(&http, &server.uri(), "test-key", 45);
        let places = client.fetch_all("강원도", "농협").await.unwrap();
        let names: Vec<&str> = places.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["강원농협 춘천지점", "강원농협 원주지점", "홍천농협"]);
        assert_eq!(places[0].address, "강원 춘천시 중앙로 1");
    }

    #[tokio::test]
    async fn page_cap_stops_paging() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(KEYWORD_SEARCH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![doc("강원농협")])))
            .expect(2)
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let client = PlacesClient::new(&http, &server.uri(), "test-key", 2);
        let places = client.fetch_all("강원도", "농협").await.unwrap();
        assert_eq!(places.len(), 2);
    }

    #[tokio::test]
    async fn rejected_key_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"errorType": "AccessDeniedError"})))
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let client = PlacesClient::new(&http, &server.uri(), "bad-key", 45);
        let err = client.fetch_all("강원도", "농협").await.unwrap_err();
        assert!(matches!(err, FeedError::Http { status, .. } if status.as_u16() == 401));
    }
}
