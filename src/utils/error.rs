// src/utils/error.rs
use thiserror::Error;

// Errors talking to the external collaborators (site feed, places search, sheet upload)
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error {status} for {url}")]
    Http { status: reqwest::StatusCode, url: String },

    #[error("Failed to parse feed response: {0}")]
    Parse(String),

    #[error("Could not read site file: {0}")]
    Io(#[from] std::io::Error),

    #[error("No site feed configured (set SHEET_ENDPOINT or pass --sites)")]
    MissingSource,
}

// Per-site failures. These are recorded on the site outcome and never abort a run.
#[derive(Error, Debug)]
pub enum SiteError {
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("navigation to {url} timed out")]
    Timeout { url: String },

    #[error("no branch/office link found on {url}")]
    LinkNotFound { url: String },

    #[error("scraping branch page {url} failed: {reason}")]
    Scrape { url: String, reason: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("invalid pattern for {name}: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Feed failed: {0}")]
    Feed(#[from] FeedError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_errors_name_the_failing_url() {
        let err = SiteError::LinkNotFound { url: "https://nh.example/".to_string() };
        assert_eq!(err.to_string(), "no branch/office link found on https://nh.example/");

        let err = SiteError::Timeout { url: "https://nh.example/branch".to_string() };
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn feed_errors_convert_into_app_error() {
        let app: AppError = FeedError::MissingSource.into();
        assert!(matches!(app, AppError::Feed(FeedError::MissingSource)));
        assert!(app.to_string().starts_with("Feed failed"));
    }
}
