//! Flat-file dataset store.
//!
//! Layout: `{root}/{ENTITY}/{feed.file_name}` plus a `{stem}.meta.json` sidecar.
//!
//! Features:
//! - Atomic writes (write to .tmp, fsync, rename into place)
//! - UTF-8 BOM on write, stripped on read
//! - Stable header: the dataset's column order, dates written verbatim
//! - Metadata sidecar per dataset (row count, date range, hash, last sync time)

use super::provider::SyncError;
use crate::domain::{Dataset, FeedSpec, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Durable storage for one dataset per (entity, feed).
pub trait DatasetStore {
    /// Load the persisted dataset. A dataset that was never saved loads as empty.
    fn load(&self, entity: &str, feed: &FeedSpec) -> Result<Dataset, SyncError>;

    /// Replace the persisted dataset. Readers see either the old or the new content.
    fn save(&self, entity: &str, feed: &FeedSpec, dataset: &Dataset) -> Result<(), SyncError>;

    /// Metadata of the last successful save, if any.
    fn last_sync(&self, _entity: &str, _feed: &FeedSpec) -> Option<SyncMeta> {
        None
    }
}

/// Metadata sidecar for a persisted dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncMeta {
    pub entity: String,
    pub feed: String,
    pub row_count: usize,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
    pub data_hash: String,
    pub synced_at: DateTime<Utc>,
}

/// Per-dataset status row, for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetStatus {
    pub entity: String,
    pub feed: String,
    pub exists: bool,
    pub meta: Option<SyncMeta>,
}

/// CSV-backed dataset store.
pub struct CsvStore {
    root: PathBuf,
}

impl CsvStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for one entity: `{root}/{ENTITY}/`
    fn entity_dir(&self, entity: &str) -> PathBuf {
        self.root.join(entity)
    }

    /// Path to the dataset file for an entity and feed.
    pub fn dataset_path(&self, entity: &str, feed: &FeedSpec) -> PathBuf {
        self.entity_dir(entity).join(&feed.file_name)
    }

    /// Path to the metadata sidecar for an entity and feed.
    fn meta_path(&self, entity: &str, feed: &FeedSpec) -> PathBuf {
        self.entity_dir(entity)
            .join(format!("{}.meta.json", feed.file_stem()))
    }

    /// Read-only view of the current merged rows for downstream readers.
    pub fn list_rows(&self, entity: &str, feed: &FeedSpec) -> Result<Vec<Record>, SyncError> {
        Ok(self.load(entity, feed)?.into_rows())
    }

    /// Which datasets exist, and their sidecar metadata.
    pub fn status(&self, entities: &[String], feeds: &[FeedSpec]) -> Vec<DatasetStatus> {
        entities
            .iter()
            .flat_map(|entity| {
                feeds.iter().map(move |feed| DatasetStatus {
                    entity: entity.clone(),
                    feed: feed.name.clone(),
                    exists: self.dataset_path(entity, feed).exists(),
                    meta: self.last_sync(entity, feed),
                })
            })
            .collect()
    }
}

impl DatasetStore for CsvStore {
    fn load(&self, entity: &str, feed: &FeedSpec) -> Result<Dataset, SyncError> {
        check_entity(entity)?;
        let path = self.dataset_path(entity, feed);
        if !path.exists() {
            return Ok(Dataset::empty());
        }

        let bytes = fs::read(&path)
            .map_err(|e| SyncError::Store(format!("read {}: {e}", path.display())))?;
        decode_csv(&bytes).map_err(|e| SyncError::Store(format!("{}: {e}", path.display())))
    }

    fn save(&self, entity: &str, feed: &FeedSpec, dataset: &Dataset) -> Result<(), SyncError> {
        if dataset.is_empty() {
            return Err(SyncError::Store("refusing to persist an empty dataset".into()));
        }
        check_entity(entity)?;

        let dir = self.entity_dir(entity);
        fs::create_dir_all(&dir)
            .map_err(|e| SyncError::Store(format!("failed to create dir: {e}")))?;

        let bytes = encode_csv(dataset)?;
        write_atomic(&self.dataset_path(entity, feed), &bytes)?;

        let (first_date, last_date) = dataset.date_range(&feed.date_field);
        let meta = SyncMeta {
            entity: entity.to_string(),
            feed: feed.name.clone(),
            row_count: dataset.len(),
            first_date: first_date.map(str::to_string),
            last_date: last_date.map(str::to_string),
            data_hash: blake3::hash(&bytes).to_hex().to_string(),
            synced_at: Utc::now(),
        };
        // The dataset is already replaced: a sidecar failure is logged, not returned.
        let written = serde_json::to_vec_pretty(&meta)
            .map_err(|e| SyncError::Store(format!("meta serialization: {e}")))
            .and_then(|json| write_atomic(&self.meta_path(entity, feed), &json));
        if let Err(e) = written {
            tracing::warn!(
                %entity,
                feed = %feed.name,
                "dataset saved but sync metadata was not written: {e}"
            );
        }
        Ok(())
    }

    fn last_sync(&self, entity: &str, feed: &FeedSpec) -> Option<SyncMeta> {
        let content = fs::read_to_string(self.meta_path(entity, feed)).ok()?;
        serde_json::from_str(&content).ok()
    }
}

/// Entities become directory names directly under the root.
fn check_entity(entity: &str) -> Result<(), SyncError> {
    let invalid = entity.is_empty()
        || entity == "."
        || entity == ".."
        || entity.contains(&['/', '\\', '\0'][..]);
    if invalid {
        return Err(SyncError::Store(format!("invalid entity name '{entity}'")));
    }
    Ok(())
}

// ── CSV helpers ─────────────────────────────────────────────────────

/// Serialize a dataset: BOM, header row, then one row per record.
fn encode_csv(dataset: &Dataset) -> Result<Vec<u8>, SyncError> {
    let map_err = |e: csv::Error| SyncError::Store(format!("csv write: {e}"));

    let mut wtr = csv::Writer::from_writer(UTF8_BOM.to_vec());
    wtr.write_record(dataset.columns()).map_err(map_err)?;
    for row in dataset.rows() {
        wtr.write_record(dataset.columns().iter().map(|c| row.cell(c).into_owned()))
            .map_err(map_err)?;
    }
    wtr.into_inner()
        .map_err(|e| SyncError::Store(format!("csv flush: {e}")))
}

/// Parse a persisted dataset. Every cell loads as a JSON string.
fn decode_csv(bytes: &[u8]) -> Result<Dataset, csv::Error> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(body);

    let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(
            columns
                .iter()
                .zip(record.iter())
                .map(|(c, v)| (c.clone(), Value::String(v.to_string())))
                .collect::<Record>(),
        );
    }

    Ok(Dataset::from_parts(columns, rows))
}

/// Write `bytes` to `path` via a temp file and rename, so readers never see a
/// partially written file.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), SyncError> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let write = || -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()
    };
    if let Err(e) = write() {
        let _ = fs::remove_file(&tmp_path);
        return Err(SyncError::Store(format!("write {}: {e}", tmp_path.display())));
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        SyncError::Store(format!("atomic rename failed: {e}"))
    })
}
