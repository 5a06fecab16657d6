// src/utils/html_debug.rs
use std::fs;
use std::path::Path;

use regex::Regex;

use crate::utils::error::StorageError;

/// Kind of heuristic match being highlighted in a debug dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    BranchKeyword,
    Phone,
    Fax,
}

impl Highlight {
    fn css_class(self) -> &'static str {
        match self {
            Highlight::BranchKeyword => "highlight-branch",
            Highlight::Phone => "highlight-tel",
            Highlight::Fax => "highlight-fax",
        }
    }
}

/// Wraps every highlight range of `html` in a `<span>` and returns the annotated page.
/// Ranges overlapping an earlier (leftmost) range are dropped.
pub fn annotate_html(html: &str, highlights: &[(usize, usize, Highlight)]) -> String {
    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n");
    debug_html.push_str(".highlight-branch { background-color: #90EE90; }\n");
    debug_html.push_str(".highlight-tel { background-color: #FFFF00; }\n");
    debug_html.push_str(".highlight-fax { background-color: #FFA500; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");

    let mut sorted_highlights = highlights.to_vec();
    sorted_highlights.sort_by_key(|h| h.0);

    let mut last_pos = 0;
    for (start, end, kind) in sorted_highlights {
        if start < last_pos || end > html.len() {
            continue;
        }
        debug_html.push_str(&html[last_pos..start]);
        debug_html.push_str(&format!(
            "<span class=\"{}\" title=\"Position: {}-{}, Type: {:?}\">",
            kind.css_class(),
            start,
            end,
            kind
        ));
        debug_html.push_str(&html[start..end]);
        debug_html.push_str("</span>");
        last_pos = end;
    }

    if last_pos < html.len() {
        debug_html.push_str(&html[last_pos..]);
    }

    debug_html.push_str("\n</body>\n</html>");
    debug_html
}

/// Saves a copy of a fetched branch page with every match of the given patterns highlighted.
pub fn create_debug_html(
    html: &str,
    path: &Path,
    patterns: &[(&Regex, Highlight)],
) -> Result<(), StorageError> {
    let highlights: Vec<(usize, usize, Highlight)> = patterns
        .iter()
        .flat_map(|(re, kind)| re.find_iter(html).map(move |m| (m.start(), m.end(), *kind)))
        .collect();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, annotate_html(html, &highlights))?;

    tracing::info!("Saved debug HTML to {} ({} highlights)", path.display(), highlights.len());
    Ok(())
}
