// src/extractors/links.rs

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use scraper::{Html, Selector};

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a").expect("Failed to compile ANCHOR_SELECTOR"));

/// Visible-text keywords of a link that leads to a branch/office listing.
pub const BRANCH_LINK_KEYWORDS: [&str; 6] = ["사무소", "지점", "출장소", "분소", "본점", "센터"];

/// An anchor element as seen on a loaded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: Option<String>,
    pub text: String,
}

/// All anchors of a document in document order.
pub fn anchors_in(document: &Html) -> Vec<Anchor> {
    document
        .select(&ANCHOR_SELECTOR)
        .map(|a| Anchor {
            href: a.value().attr("href").map(str::to_string),
            text: a.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" "),
        })
        .collect()
}

/// Picks the link to the branch listing: the first keyword anchor whose URL matches
/// `sub_index`, else the first keyword anchor in document order. `None` when nothing qualifies.
pub fn resolve_branch_link(anchors: &[Anchor], page_url: &Url, sub_index: &Regex) -> Option<Url> {
    let candidates: Vec<Url> = anchors
        .iter()
        .filter(|a| BRANCH_LINK_KEYWORDS.iter().any(|kw| a.text.contains(kw)))
        .filter_map(|a| navigable_url(a.href.as_deref()?, page_url))
        .collect();

    tracing::debug!("{} branch link candidates on {}", candidates.len(), page_url);

    if let Some(preferred) = candidates.iter().find(|url| sub_index.is_match(url.as_str())) {
        return Some(preferred.clone());
    }
    candidates.into_iter().next()
}

/// Resolves an href against the page, dropping script/mail/phone links and bare fragments.
fn navigable_url(href: &str, page_url: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let url = page_url.join(href).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}
