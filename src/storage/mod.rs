// src/storage/mod.rs
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::utils::error::StorageError;

/// Byte-order mark so spreadsheet applications open the CSV as UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified output directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Location of an output file. Absolute names are used as given.
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.base_dir.join(file_name)
    }

    /// Location of the annotated debug copy of a site's branch page.
    pub fn debug_path(&self, site_name: &str) -> PathBuf {
        let safe: String = site_name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_dir.join("debug").join(format!("{}.html", safe))
    }

    /// Writes records as CSV with a UTF-8 BOM. The header comes from the record's
    /// serialized field names. Empty input writes nothing and returns `Ok(None)`.
    pub fn save_csv<T: Serialize>(&self, file_name: &str, records: &[T]) -> Result<Option<PathBuf>, StorageError> {
        let file_path = self.path_for(file_name);
        if records.is_empty() {
            tracing::warn!("No records to export; skipping {}", file_path.display());
            return Ok(None);
        }

        ensure_parent(&file_path)?;
        let mut file = fs::File::create(&file_path)?;
        file.write_all(UTF8_BOM)?;

        let mut writer = csv::Writer::from_writer(file);
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        tracing::info!("Saved {} rows to {}", records.len(), file_path.display());
        Ok(Some(file_path))
    }

    /// Writes a pretty-printed JSON document (the local backup of a crawl).
    pub fn save_json<T: Serialize + ?Sized>(&self, file_name: &str, value: &T) -> Result<PathBuf, StorageError> {
        let file_path = self.path_for(file_name);
        let body = serde_json::to_string_pretty(value)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        ensure_parent(&file_path)?;
        fs::write(&file_path, body)?;

        tracing::info!("Saved JSON to {}", file_path.display());
        Ok(file_path)
    }

    pub fn save_text(&self, file_name: &str, text: &str) -> Result<PathBuf, StorageError> {
        let file_path = self.path_for(file_name);
        ensure_parent(&file_path)?;
        fs::write(&file_path, text)?;
        tracing::info!("Saved report to {}", file_path.display());
        Ok(file_path)
    }
}

/// Reads a headed CSV file (with or without BOM) into header → value maps.
pub fn read_csv_rows(path: &Path) -> Result<Vec<HashMap<String, String>>, StorageError> {
    let text = fs::read_to_string(path)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for row in reader.deserialize::<HashMap<String, String>>() {
        rows.push(row?);
    }
    tracing::debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

fn ensure_parent(path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
