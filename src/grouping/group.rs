// src/grouping/group.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Characters stripped from a place name after removing the cooperative name.
const QUALIFIER_CHARS: [char; 2] = ['지', '점'];

/// One place from the places-search feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub address: String,
    pub phone: String,
}

/// A place filed under its parent cooperative. Column names match the sheet the
/// cleaning step reads back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedRecord {
    #[serde(rename = "메인브랜치")]
    pub main: String,
    #[serde(rename = "서브브랜치")]
    pub sub: String,
    #[serde(rename = "주소")]
    pub address: String,
    #[serde(rename = "전화번호")]
    pub phone: String,
    #[serde(rename = "업체명")]
    pub name: String,
}

/// Parent cooperative name: everything before the first `marker`, with the marker re-appended.
///
/// `"강원농협 원주지점"` → `"강원농협"`. A name without the marker keeps its full text.
pub fn main_name(name: &str, marker: &str) -> String {
    if marker.is_empty() {
        return name.trim().to_string();
    }
    let head = name.split(marker).next().unwrap_or_default();
    format!("{}{}", head.trim(), marker)
}

/// Branch qualifier of a place, `main_office_label` when the place is (or reduces to) the main office.
pub fn branch_name(name: &str, main: &str, main_office_label: &str) -> String {
    if !main_office_label.is_empty() && name.contains(main_office_label) {
        return main_office_label.to_string();
    }
    let stripped: String = name
        .replacen(main, "", 1)
        .chars()
        .filter(|c| !QUALIFIER_CHARS.contains(c))
        .collect();
    let stripped = stripped.trim();
    if stripped.is_empty() {
        main_office_label.to_string()
    } else {
        stripped.to_string()
    }
}

/// Groups places by parent cooperative, keeping groups in order of first appearance
/// and places in input order within each group.
pub fn group_places(places: &[Place], marker: &str, main_office_label: &str) -> Vec<GroupedRecord> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<GroupedRecord>> = Vec::new();

    for place in places {
        let main = main_name(&place.name, marker);
        let sub = branch_name(&place.name, &main, main_office_label);
        let record = GroupedRecord {
            main: main.clone(),
            sub,
            address: place.address.clone(),
            phone: place.phone.clone(),
            name: place.name.clone(),
        };

        let slot = *index.entry(main).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(record);
    }

    tracing::debug!("Grouped {} places under {} cooperatives", places.len(), groups.len());
    groups.into_iter().flatten().collect()
}
