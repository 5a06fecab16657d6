// src/extractors/record.rs

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// --- Regex Patterns (Lazy Static) ---

/// Words that mark a line as naming a branch or office.
pub static BRANCH_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"본점|지점|지소|사무소|출장소|분소|센터").expect("Failed to compile BRANCH_NAME_RE")
});

// Labels are case-sensitive so a bare `t`/`f` inside latin words never counts as a label.
pub static TEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:Tel|TEL|tel|전화(?:번호)?|T|☎)\s*[.:：)]?\s*(\(?\d[\d()\-]{5,}\d)")
        .expect("Failed to compile TEL_RE")
});

pub static FAX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:Fax|FAX|fax|팩스(?:번호)?|F)\s*[.:：)]?\s*(\(?\d[\d()\-]{5,}\d)")
        .expect("Failed to compile FAX_RE")
});

// Road / administrative-unit markers.
static ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:로|길|구|동|읍|면|리)\s|번지|호").expect("Failed to compile ADDRESS_RE")
});

// --- Data Structures ---

/// One branch parsed out of a free-form text block. Absent fields stay `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BranchRecord {
    pub name: Option<String>,
    pub address: Option<String>,
    pub tel: Option<String>,
    pub fax: Option<String>,
    pub raw: Vec<String>,
}

/// Splits a block into trimmed, non-empty lines.
pub fn block_lines(block: &str) -> Vec<String> {
    block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Best-effort parse of one branch block. Never fails: missing fields come back as `None`.
pub fn parse_branch_lines(lines: &[String]) -> BranchRecord {
    let name = lines
        .iter()
        .find(|line| BRANCH_NAME_RE.is_match(line))
        .or_else(|| lines.first())
        .cloned();

    let flat = lines.join(" ");
    let tel = first_capture(&TEL_RE, &flat);
    let fax = first_capture(&FAX_RE, &flat);

    let address = lines
        .iter()
        .find(|line| ADDRESS_RE.is_match(line) && !TEL_RE.is_match(line) && !FAX_RE.is_match(line))
        .cloned();

    BranchRecord {
        name,
        address,
        tel,
        fax,
        raw: lines.to_vec(),
    }
}

/// Convenience wrapper over [`parse_branch_lines`] for a raw text block.
pub fn parse_branch_block(block: &str) -> BranchRecord {
    parse_branch_lines(&block_lines(block))
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}
