// src/pipeline/clean.rs
//! Cleaning pass over a grouped CSV: classify, normalize phones, dedup, derive region, report.

use std::collections::HashMap;
use std::path::Path;

use crate::config::Patterns;
use crate::grouping::{ClassifiedRecord, GroupedRecord};
use crate::normalize::{dedup, extract_region, normalize_phone};
use crate::storage::{read_csv_rows, StorageManager};
use crate::utils::AppError;

pub const CLEAN_CSV: &str = "branches_clean.csv";
pub const CLEAN_REPORT: &str = "cleanNH_report.txt";

/// First non-empty value among the given columns (English name first, then the sheet header).
fn pick(row: &HashMap<String, String>, columns: &[&str]) -> String {
    columns
        .iter()
        .filter_map(|col| row.get(*col))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Reads grouped rows from either the grouped CSV headers or plain English headers.
pub fn grouped_from_rows(rows: &[HashMap<String, String>]) -> Vec<GroupedRecord> {
    rows.iter()
        .map(|row| GroupedRecord {
            main: pick(row, &["main", "메인브랜치", "name"]),
            sub: pick(row, &["sub", "서브브랜치"]),
            address: pick(row, &["address", "주소"]),
            phone: pick(row, &["phone", "전화번호"]),
            name: pick(row, &["name", "업체명", "메인브랜치"]),
        })
        .collect()
}

/// Classify + normalize phone, dedup by (main, address), then attach region.
pub fn clean_records(grouped: Vec<GroupedRecord>, patterns: &Patterns) -> Vec<ClassifiedRecord> {
    let classified: Vec<ClassifiedRecord> = grouped
        .into_iter()
        .map(|record| {
            let mut classified = ClassifiedRecord::from_grouped(record);
            classified.phone = normalize_phone(&classified.phone);
            classified
        })
        .collect();

    dedup(classified, &patterns.main_office_label)
        .into_iter()
        .map(|mut record| {
            record.region = extract_region(&record.address, &patterns.region);
            record
        })
        .collect()
}

/// Data-quality summary of a cleaned set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanReport {
    pub total: usize,
    pub missing_address: usize,
    pub missing_phone: usize,
    /// Addresses that still occur more than once (different cooperatives at one address).
    pub duplicate_addresses: usize,
    /// Records per region in order of first appearance; empty regions are not counted.
    pub regions: Vec<(String, usize)>,
}

impl CleanReport {
    pub fn from_records(records: &[ClassifiedRecord]) -> Self {
        let mut address_counts: HashMap<&str, usize> = HashMap::new();
        for record in records {
            *address_counts.entry(record.address.as_str()).or_insert(0) += 1;
        }

        let mut regions: Vec<(String, usize)> = Vec::new();
        for record in records.iter().filter(|r| !r.region.is_empty()) {
            match regions.iter_mut().find(|(region, _)| *region == record.region) {
                Some((_, count)) => *count += 1,
                None => regions.push((record.region.clone(), 1)),
            }
        }

        Self {
            total: records.len(),
            missing_address: records.iter().filter(|r| r.address.is_empty()).count(),
            missing_phone: records.iter().filter(|r| r.phone.is_empty()).count(),
            duplicate_addresses: address_counts.values().filter(|&&c| c > 1).count(),
            regions,
        }
    }

    pub fn render(&self) -> String {
        let mut report = String::from("=== Branches Data Report ===\n");
        report.push_str(&format!("생성 시각: {}\n", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")));
        report.push_str(&format!("총 데이터 수: {}\n", self.total));
        report.push_str(&format!("주소 누락: {}\n", self.missing_address));
        report.push_str(&format!("전화번호 누락: {}\n", self.missing_phone));
        report.push_str(&format!("중복 주소 수: {}\n", self.duplicate_addresses));
        report.push_str("\n[시군별 분포]\n");
        for (region, count) in &self.regions {
            report.push_str(&format!("- {}: {}\n", region, count));
        }
        report
    }
}

/// Runs the whole cleaning pass from `input` into the storage directory.
pub fn run_clean(input: &Path, patterns: &Patterns, storage: &StorageManager) -> Result<CleanReport, AppError> {
    tracing::info!("Cleaning {}", input.display());
    let rows = read_csv_rows(input)?;
    let cleaned = clean_records(grouped_from_rows(&rows), patterns);

    let report = CleanReport::from_records(&cleaned);
    let rendered = report.render();
    tracing::info!("\n{}", rendered);
    storage.save_text(CLEAN_REPORT, &rendered)?;

    storage.save_csv(CLEAN_CSV, &cleaned)?;
    tracing::info!("Cleaning done: {} rows -> {} rows", rows.len(), cleaned.len());
    Ok(report)
}
