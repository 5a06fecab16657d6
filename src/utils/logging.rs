// src/utils/logging.rs
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber for the scraper's per-site progress lines.
/// `RUST_LOG` narrows or widens it (`debug` shows link candidates and block counts,
/// `trace` shows skipped blocks and dedup replacements). Without it only `info`
/// and above are printed. Module targets are hidden.
pub fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(false).init();

    tracing::debug!("Logging ready (RUST_LOG={:?})", std::env::var("RUST_LOG").ok());
}
