// src/config.rs
use regex::Regex;

use crate::utils::error::ConfigError;

pub const DEFAULT_KAKAO_BASE_URL: &str = "https://dapi.kakao.com";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
pub const DEFAULT_REGION_PATTERN: &str = r"강원(?:특별자치도|도)?\s*(\S+?[시군])";
pub const DEFAULT_SUB_INDEX_PATTERN: &str = r"(?i)sub_?index";
pub const DEFAULT_MAIN_OFFICE_LABEL: &str = "본점";
pub const DEFAULT_COOP_MARKER: &str = "농협";

/// Runtime settings shared by every pipeline.
#[derive(Debug, Clone)]
pub struct Settings {
    pub sheet_endpoint: Option<String>,
    pub kakao_api_key: Option<String>,
    pub kakao_base_url: String,
    pub page_timeout_secs: u64,
    pub request_delay_ms: u64,
    pub user_agent: String,
    pub patterns: Patterns,
}

/// Locale-specific heuristics. The defaults follow Gangwon addresses and NH naming;
/// other provinces override them through the environment or CLI.
#[derive(Debug, Clone)]
pub struct Patterns {
    pub region: Regex,
    pub sub_index: Regex,
    pub main_office_label: String,
    pub coop_marker: String,
}

impl Default for Patterns {
    fn default() -> Self {
        Self {
            region: Regex::new(DEFAULT_REGION_PATTERN).expect("default region pattern"),
            sub_index: Regex::new(DEFAULT_SUB_INDEX_PATTERN).expect("default sub-index pattern"),
            main_office_label: DEFAULT_MAIN_OFFICE_LABEL.to_string(),
            coop_marker: DEFAULT_COOP_MARKER.to_string(),
        }
    }
}

impl Settings {
    /// Reads settings from the process environment after loading `.env`.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key))
    }

    /// Builds settings through an env-var lookup, so tests can feed a plain map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let optional = |var: &str| lookup(var).ok().filter(|v| !v.trim().is_empty());
        let or_default = |var: &str, default: &str| optional(var).unwrap_or_else(|| default.to_string());

        let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
            let raw = or_default(var, default);
            raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
        };

        let patterns = Patterns {
            region: compile_pattern("REGION_PATTERN", &or_default("REGION_PATTERN", DEFAULT_REGION_PATTERN))?,
            sub_index: compile_pattern(
                "SUB_INDEX_PATTERN",
                &or_default("SUB_INDEX_PATTERN", DEFAULT_SUB_INDEX_PATTERN),
            )?,
            main_office_label: or_default("MAIN_OFFICE_LABEL", DEFAULT_MAIN_OFFICE_LABEL),
            coop_marker: or_default("COOP_MARKER", DEFAULT_COOP_MARKER),
        };

        Ok(Self {
            sheet_endpoint: optional("SHEET_ENDPOINT"),
            kakao_api_key: optional("KAKAO_API_KEY"),
            kakao_base_url: or_default("KAKAO_BASE_URL", DEFAULT_KAKAO_BASE_URL),
            page_timeout_secs: parse_u64("PAGE_TIMEOUT_SECS", "30")?,
            request_delay_ms: parse_u64("REQUEST_DELAY_MS", "150")?,
            user_agent: or_default("SCRAPER_USER_AGENT", DEFAULT_USER_AGENT),
            patterns,
        })
    }

    /// The places-search key, required only by the `fetch` pipeline.
    pub fn require_kakao_key(&self) -> Result<&str, ConfigError> {
        self.kakao_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("KAKAO_API_KEY".to_string()))
    }
}

/// Compiles a user-supplied pattern, naming the setting it came from on failure.
pub fn compile_pattern(name: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        name: name.to_string(),
        source,
    })
}
