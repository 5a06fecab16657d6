// src/feed/client.rs
use std::path::Path;
use std::time::Duration;

use reqwest::{header, Url};
use serde::Serialize;

use crate::config::Settings;
use crate::feed::models::{sites_from_sheet_rows, LocalSiteEntry, Site, UploadOutcome};
use crate::utils::error::{FeedError, SiteError};

/// A fetched page together with the URL it finally resolved to (after redirects).
#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub url: Url,
    pub html: String,
}

/// Creates the one HTTP client used for the whole run. The timeout is the hard
/// per-navigation deadline.
pub fn build_client(settings: &Settings) -> Result<reqwest::Client, FeedError> {
    let client = reqwest::Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(Duration::from_secs(settings.page_timeout_secs))
        .build()?;
    Ok(client)
}

/// Loads one page. Failures are per-site errors, never fatal to the run.
pub async fn fetch_page(client: &reqwest::Client, url: &str, delay_ms: u64) -> Result<LoadedPage, SiteError> {
    if delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
    tracing::debug!("Loading page {}", url);

    let to_site_error = |err: reqwest::Error| {
        if err.is_timeout() {
            SiteError::Timeout { url: url.to_string() }
        } else {
            SiteError::Navigation {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    };

    let response = client
        .get(url)
        .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*")
        .send()
        .await
        .map_err(to_site_error)?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!("HTTP error status: {} for URL: {}", status, url);
        return Err(SiteError::Navigation {
            url: url.to_string(),
            reason: format!("HTTP {}", status),
        });
    }

    let final_url = response.url().clone();
    let html = response.text().await.map_err(to_site_error)?;
    tracing::debug!("Loaded {} bytes from {}", html.len(), final_url);

    Ok(LoadedPage { url: final_url, html })
}

/// Reads the site list from the spreadsheet backend (GET, JSON array of rows).
pub async fn load_sites_from_sheet(client: &reqwest::Client, endpoint: &str) -> Result<Vec<Site>, FeedError> {
    tracing::info!("Loading site list from sheet backend");
    let response = client.get(endpoint).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::Http {
            status,
            url: endpoint.to_string(),
        });
    }

    let rows: Vec<serde_json::Value> = response
        .json()
        .await
        .map_err(|e| FeedError::Parse(format!("site sheet is not a JSON array of rows: {}", e)))?;

    let sites = sites_from_sheet_rows(&rows);
    tracing::info!("Loaded {} sites ({} rows)", sites.len(), rows.len());
    Ok(sites)
}

/// Reads the site list from a local JSON file of `{region, coop, url}` objects.
pub fn load_sites_from_file(path: &Path) -> Result<Vec<Site>, FeedError> {
    let text = std::fs::read_to_string(path)?;
    let entries: Vec<LocalSiteEntry> = serde_json::from_str(&text)
        .map_err(|e| FeedError::Parse(format!("{}: {}", path.display(), e)))?;

    let sites: Vec<Site> = entries.into_iter().map(Site::from).collect();
    tracing::info!("Loaded {} sites from {}", sites.len(), path.display());
    Ok(sites)
}

/// Posts the final results to the sheet backend.
/// Only transport failures are errors; rejections and odd bodies come back as outcomes.
pub async fn post_results<T: Serialize + ?Sized>(
    client: &reqwest::Client,
    endpoint: &str,
    results: &T,
) -> Result<UploadOutcome, FeedError> {
    let response = client.post(endpoint).json(results).send().await?;
    let status = response.status();
    let body = response.text().await?;
    tracing::debug!("Upload answered {} ({} bytes)", status, body.len());
    Ok(UploadOutcome::from_body(&body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_settings() -> Settings {
        Settings::from_lookup(|key| match key {
            "PAGE_TIMEOUT_SECS" => Ok("1".to_string()),
            _ => Err(std::env::VarError::NotPresent),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn sheet_sites_are_loaded_and_filtered() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/exec"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"지역": "춘천시", "농·축협": "춘천농협", "홈페이지": "https://chuncheon.nh.example"},
                {"지역": "원주시", "농·축협": "원주농협", "홈페이지": ""}
            ])))
            .mount(&server)
            .await;

        let client = build_client(&test_settings()).unwrap();
        let sites = load_sites_from_sheet(&client, &format!("{}/exec", server.uri())).await.unwrap();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].cooperative_name, "춘천농협");
    }

    #[tokio::test]
    async fn sheet_http_failure_is_a_feed_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = build_client(&test_settings()).unwrap();
        let result = load_sites_from_sheet(&client, &server.uri()).await;
        let err = tokio_test::assert_err!(result);
        assert!(matches!(err, FeedError::Http { status, .. } if status.as_u16() == 500));
    }

    #[tokio::test]
    async fn sheet_non_json_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let client = build_client(&test_settings()).unwrap();
        let err = load_sites_from_sheet(&client, &server.uri()).await.unwrap_err();
        assert!(matches!(err, FeedError::Parse(_)));
    }

    #[tokio::test]
    async fn page_errors_are_site_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let client = build_client(&test_settings()).unwrap();
        let err = fetch_page(&client, &format!("{}/missing", server.uri()), 0).await.unwrap_err();
        assert!(matches!(err, SiteError::Navigation { ref reason, .. } if reason.contains("404")));

        let err = fetch_page(&client, &format!("{}/slow", server.uri()), 0).await.unwrap_err();
        assert!(matches!(err, SiteError::Timeout { .. }));
    }

    #[tokio::test]
    async fn page_is_returned_with_final_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/index.do"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<a href=\"/b\">지점</a>"))
            .mount(&server)
            .await;

        let client = build_client(&test_settings()).unwrap();
        let page = tokio_test::assert_ok!(fetch_page(&client, &format!("{}/index.do", server.uri()), 0).await);
        assert_eq!(page.url.path(), "/index.do");
        assert!(page.html.contains("지점"));
    }

    #[tokio::test]
    async fn upload_outcomes_are_reported_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ok"))
            .and(body_json(json!([{"name": "춘천지점"}])))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "count": 1})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Script error"))
            .mount(&server)
            .await;

        let client = build_client(&test_settings()).unwrap();
        let rows = json!([{"name": "춘천지점"}]);

        let outcome = post_results(&client, &format!("{}/ok", server.uri()), &rows).await.unwrap();
        assert_eq!(outcome, UploadOutcome::Accepted { count: 1 });

        let outcome = post_results(&client, &format!("{}/broken", server.uri()), &rows).await.unwrap();
        assert_eq!(outcome, UploadOutcome::Unparsed { body: "Script error".to_string() });
    }

    #[test]
    fn local_site_file_is_read() {
        let path = std::env::temp_dir().join(format!("nh_sites_{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"[{"region": "춘천시", "coop": "춘천농협", "url": "https://chuncheon.nh.example"}]"#,
        )
        .unwrap();

        let sites = load_sites_from_file(&path).unwrap();
        assert_eq!(
            sites,
            vec![Site {
                region: "춘천시".to_string(),
                cooperative_name: "춘천농협".to_string(),
                base_url: "https://chuncheon.nh.example".to_string(),
            }]
        );
        std::fs::remove_file(&path).unwrap();
    }
}
