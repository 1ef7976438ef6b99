//! Product history
//!
//! Remembers the products created through the service in a single JSON file.
//! Records are kept newest first and capped at `history.max_entries`. One
//! process owns the file; there is no cross-process locking.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::HistorySettings;
use crate::domain::{ProductTemplate, ProductType};
use crate::mockup::MockupOutcome;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("history serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A product created through the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HistoryRecord {
    pub id: Uuid,
    /// Fulfillment provider product ID
    pub product_id: String,
    pub product_type: ProductType,
    pub title: String,
    pub preview_url: Option<String>,
    pub design_url: Option<String>,
    pub blueprint_id: u32,
    pub print_provider_id: u32,
    #[serde(default)]
    pub variant_ids: Vec<u64>,
    pub created_at: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn from_outcome(template: &ProductTemplate, outcome: &MockupOutcome) -> Self {
        HistoryRecord {
            id: Uuid::new_v4(),
            product_id: outcome.product_id.clone(),
            product_type: template.product_type,
            title: outcome.title.clone(),
            preview_url: outcome.preview_url.clone(),
            design_url: outcome.design_url.clone(),
            blueprint_id: template.blueprint_id,
            print_provider_id: template.print_provider_id,
            variant_ids: outcome.variant_ids.clone(),
            created_at: Utc::now(),
        }
    }
}

/// JSON-file backed history
pub struct HistoryStore {
    path: PathBuf,
    max_entries: usize,
    records: RwLock<Vec<HistoryRecord>>,
    /// Serializes file writes so snapshots land in order
    write_lock: tokio::sync::Mutex<()>,
}

impl HistoryStore {
    /// Load the history file; a missing or unreadable file starts empty
    pub async fn open(settings: &HistorySettings) -> Result<Self, HistoryError> {
        let path = settings.path.clone();

        let mut records = match tokio::fs::read(&path).await {
            Ok(raw) => match serde_json::from_slice::<Vec<HistoryRecord>>(&raw) {
                Ok(records) => records,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "History file is corrupt, starting empty");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(HistoryError::Io { path, source }),
        };

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(settings.max_entries);

        info!(path = %path.display(), count = records.len(), "History loaded");

        Ok(HistoryStore {
            path,
            max_entries: settings.max_entries,
            records: RwLock::new(records),
            write_lock: tokio::sync::Mutex::new(()),
        })
    }

    /// Newest first
    pub fn list(&self) -> Vec<HistoryRecord> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Prepend a record, dropping the oldest beyond the cap
    pub async fn append(&self, record: HistoryRecord) -> Result<HistoryRecord, HistoryError> {
        let _guard = self.write_lock.lock().await;

        let snapshot = {
            let mut records = self.records.write();
            records.insert(0, record.clone());
            records.truncate(self.max_entries);
            records.clone()
        };

        self.persist(&snapshot).await?;
        debug!(id = %record.id, product_id = %record.product_id, "History record appended");
        Ok(record)
    }

    /// Remove a record, returning whether it existed
    pub async fn remove(&self, id: Uuid) -> Result<bool, HistoryError> {
        let _guard = self.write_lock.lock().await;

        let snapshot = {
            let mut records = self.records.write();
            let before = records.len();
            records.retain(|r| r.id != id);
            if records.len() == before {
                return Ok(false);
            }
            records.clone()
        };

        self.persist(&snapshot).await?;
        debug!(id = %id, "History record removed");
        Ok(true)
    }

    /// Write to a sibling temp file, then rename over the original
    async fn persist(&self, records: &[HistoryRecord]) -> Result<(), HistoryError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| HistoryError::Io { path, source }
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err(parent))?;
        }

        let json = serde_json::to_vec_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(io_err(&tmp))?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err(&self.path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn settings(dir: &tempfile::TempDir, max_entries: usize) -> HistorySettings {
        HistorySettings {
            path: dir.path().join("nested").join("history.json"),
            max_entries,
        }
    }

    fn record(product_id: &str) -> HistoryRecord {
        HistoryRecord {
            id: Uuid::new_v4(),
            product_id: product_id.to_string(),
            product_type: ProductType::Mug,
            title: "Coffee Mug - Custom Design".to_string(),
            preview_url: Some("https://images.printify.com/mockup.png".to_string()),
            design_url: None,
            blueprint_id: 68,
            print_provider_id: 1,
            variant_ids: vec![33719],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_append_lists_newest_first_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::open(&settings(&dir, 500)).await.unwrap();

        store.append(record("a")).await.unwrap();
        store.append(record("b")).await.unwrap();

        let ids: Vec<String> = store.list().into_iter().map(|r| r.product_id).collect();
        assert_eq!(ids, vec!["b", "a"]);

        let reopened = HistoryStore::open(&settings(&dir, 500)).await.unwrap();
        assert_eq!(reopened.list(), store.list());
    }

    #[tokio::test]
    async fn test_cap_drops_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::open(&settings(&dir, 3)).await.unwrap();

        for id in ["1", "2", "3", "4", "5"] {
            store.append(record(id)).await.unwrap();
        }

        let ids: Vec<String> = store.list().into_iter().map(|r| r.product_id).collect();
        assert_eq!(ids, vec!["5", "4", "3"]);
    }

    #[tokio::test]
    async fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::open(&settings(&dir, 500)).await.unwrap();
        let kept = store.append(record("keep")).await.unwrap();
        let gone = store.append(record("gone")).await.unwrap();

        assert!(store.remove(gone.id).await.unwrap());
        assert!(!store.remove(gone.id).await.unwrap());
        assert_eq!(store.list(), vec![kept]);
    }

    #[tokio::test]
    async fn test_open_sorts_and_tolerates_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(&dir, 500);
        tokio::fs::create_dir_all(settings.path.parent().unwrap()).await.unwrap();

        let mut older = record("older");
        older.created_at = Utc::now() - Duration::hours(2);
        let newer = record("newer");
        tokio::fs::write(&settings.path, serde_json::to_vec(&vec![older, newer]).unwrap())
            .await
            .unwrap();

        let store = HistoryStore::open(&settings).await.unwrap();
        assert_eq!(store.list()[0].product_id, "newer");

        tokio::fs::write(&settings.path, b"{not json").await.unwrap();
        let store = HistoryStore::open(&settings).await.unwrap();
        assert_eq!(store.len(), 0);
    }
}
