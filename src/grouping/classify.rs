// src/grouping/classify.rs

use serde::{Deserialize, Serialize};

use super::group::GroupedRecord;

/// Kind of cooperative office a name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoopType {
    SpecialNh,
    NhBankSub,
    NhBankMain,
    LocalNh,
    Other,
    Unknown,
}

impl CoopType {
    pub fn as_str(self) -> &'static str {
        match self {
            CoopType::SpecialNh => "SPECIAL_NH",
            CoopType::NhBankSub => "NH_BANK_SUB",
            CoopType::NhBankMain => "NH_BANK_MAIN",
            CoopType::LocalNh => "LOCAL_NH",
            CoopType::Other => "OTHER",
            CoopType::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for CoopType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

type Rule = (fn(&str) -> bool, CoopType);

/// Evaluated top to bottom; the first matching predicate decides.
const RULES: [Rule; 4] = [
    (is_special_cooperative, CoopType::SpecialNh),
    (is_bank_sub_office, CoopType::NhBankSub),
    (is_bank_regional_office, CoopType::NhBankMain),
    (is_local_cooperative, CoopType::LocalNh),
];

fn is_special_cooperative(name: &str) -> bool {
    ["축산농협", "원예농협", "양돈농협"].iter().any(|kw| name.contains(kw))
}

fn is_bank_sub_office(name: &str) -> bool {
    name.contains("NH농협은행") && name.contains("출장소")
}

fn is_bank_regional_office(name: &str) -> bool {
    name.contains("NH농협은행") && name.contains("지부")
}

fn is_local_cooperative(name: &str) -> bool {
    name.contains("농협")
}

/// Classifies a place name. Empty names are `Unknown`; names matching no rule are `Other`.
pub fn classify(name: &str) -> CoopType {
    if name.trim().is_empty() {
        return CoopType::Unknown;
    }
    RULES
        .iter()
        .find(|(matches, _)| matches(name))
        .map(|(_, tag)| *tag)
        .unwrap_or(CoopType::Other)
}

/// A grouped record after cleaning: typed, phone-normalized and placed in a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    pub main: String,
    pub sub: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    #[serde(rename = "type")]
    pub coop_type: CoopType,
    pub region: String,
}

impl ClassifiedRecord {
    /// Types a grouped record by its place name, falling back to the cooperative name.
    pub fn from_grouped(record: GroupedRecord) -> Self {
        let label = if record.name.trim().is_empty() { &record.main } else { &record.name };
        let coop_type = classify(label);
        Self {
            main: record.main,
            sub: record.sub,
            name: record.name,
            address: record.address,
            phone: record.phone,
            coop_type,
            region: String::new(),
        }
    }
}
