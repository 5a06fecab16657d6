// src/normalize/mod.rs
//! Phone and region normalization plus (main, address) deduplication.

pub mod dedup;

pub use dedup::{dedup, DedupKey};

use once_cell::sync::Lazy;
use regex::Regex;

// Seoul "02", otherwise a three digit area/mobile prefix. The two digit "0X" branch
// only applies to short numbers no three digit split can cover.
static PHONE_SHAPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(02|0\d{2}|0\d)(\d+)(\d{4})$").expect("Failed to compile PHONE_SHAPE_RE")
});

/// Strips every non-digit and formats as `AREA-MID-LAST`.
/// Digit strings that do not fit the shape come back stripped but unformatted.
pub fn normalize_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    PHONE_SHAPE_RE.replace(&digits, "$1-$2-$3").into_owned()
}

/// Normalizes an optional phone, keeping absence as `None`.
pub fn normalize_optional_phone(phone: Option<&str>) -> Option<String> {
    phone.map(normalize_phone).filter(|p| !p.is_empty())
}

/// City/county token of an address (first capture group of `pattern`), or `""`.
pub fn extract_region(address: &str, pattern: &Regex) -> String {
    pattern
        .captures(address)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(0)))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
