// src/normalize/dedup.rs

use std::collections::HashMap;

use crate::grouping::{ClassifiedRecord, GroupedRecord};

/// Identity of a record for deduplication purposes.
pub trait DedupKey {
    /// Parent cooperative name.
    fn main_key(&self) -> &str;
    /// Address the record sits at.
    fn address_key(&self) -> &str;
    /// Whether the record designates the cooperative's main office.
    fn is_main_office(&self, main_office_label: &str) -> bool;
}

impl DedupKey for GroupedRecord {
    fn main_key(&self) -> &str {
        &self.main
    }

    fn address_key(&self) -> &str {
        &self.address
    }

    fn is_main_office(&self, main_office_label: &str) -> bool {
        self.sub == main_office_label
    }
}

impl DedupKey for ClassifiedRecord {
    fn main_key(&self) -> &str {
        &self.main
    }

    fn address_key(&self) -> &str {
        &self.address
    }

    fn is_main_office(&self, main_office_label: &str) -> bool {
        self.sub == main_office_label
    }
}

/// Keeps one record per (trimmed main, trimmed address).
///
/// The first record for a key is kept, except that a later main-office record
/// (see [`DedupKey::is_main_office`]) replaces it in place. Output keeps first-appearance order.
pub fn dedup<T: DedupKey>(records: Vec<T>, main_office_label: &str) -> Vec<T> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut unique: Vec<T> = Vec::with_capacity(records.len());
    let input_len = records.len();

    for record in records {
        let key = (
            record.main_key().trim().to_string(),
            record.address_key().trim().to_string(),
        );
        match index.get(&key) {
            None => {
                index.insert(key, unique.len());
                unique.push(record);
            }
            Some(&slot) if record.is_main_office(main_office_label) => {
                tracing::trace!("Main office replaces earlier record for {:?}", key);
                unique[slot] = record;
            }
            Some(_) => {}
        }
    }

    tracing::debug!("Deduplicated {} records down to {}", input_len, unique.len());
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(main: &str, sub: &str, address: &str) -> GroupedRecord {
        GroupedRecord {
            main: main.to_string(),
            sub: sub.to_string(),
            address: address.to_string(),
            phone: String::new(),
            name: format!("{main} {sub}"),
        }
    }

    #[test]
    fn first_record_wins_for_plain_duplicates() {
        let out = dedup(
            vec![rec("춘천농협", "후평", "춘천시 1"), rec("춘천농협", "후평동", "춘천시 1")],
            "본점",
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].sub, "후평");
    }

    #[test]
    fn main_office_wins_when_it_comes_later() {
        let out = dedup(
            vec![rec("춘천농협", "중앙", "춘천시 1"), rec("춘천농협", "본점", "춘천시 1")],
            "본점",
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].sub, "본점");
    }

    #[test]
    fn main_office_wins_when_it_comes_first() {
        let out = dedup(
            vec![rec("춘천농협", "본점", "춘천시 1"), rec("춘천농협", "중앙", "춘천시 1")],
            "본점",
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].sub, "본점");
    }

    #[test]
    fn key_ignores_surrounding_whitespace() {
        let out = dedup(
            vec![rec("춘천농협 ", "a", " 춘천시 1"), rec("춘천농협", "b", "춘천시 1 ")],
            "본점",
        );
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn replacement_keeps_original_position() {
        let out = dedup(
            vec![
                rec("춘천농협", "중앙", "춘천시 1"),
                rec("원주농협", "단구", "원주시 2"),
                rec("춘천농협", "본점", "춘천시 1"),
            ],
            "본점",
        );
        let subs: Vec<&str> = out.iter().map(|r| r.sub.as_str()).collect();
        assert_eq!(subs, vec!["본점", "단구"]);
    }

    #[test]
    fn dedup_is_idempotent() {
        let input = vec![
            rec("춘천농협", "중앙", "춘천시 1"),
            rec("춘천농협", "본점", "춘천시 1"),
            rec("춘천농협", "본점", "춘천시 1"),
            rec("원주농협", "단구", "원주시 2"),
            rec("원주농협", "단구", "원주시 3"),
        ];
        let once = dedup(input, "본점");
        let twice = dedup(once.clone(), "본점");
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn label_is_configurable() {
        let out = dedup(
            vec![rec("농협", "중앙", "주소"), rec("농협", "본소", "주소")],
            "본소",
        );
        assert_eq!(out[0].sub, "본소");
    }
}
