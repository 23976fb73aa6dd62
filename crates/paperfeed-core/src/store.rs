//! Persisted topic -> paper-id -> row store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use thiserror::Error;

/// Rows for one topic, keyed by version-stripped paper id.
pub type PaperRows = IndexMap<String, String>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("read store {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("store {path:?} holds corrupt JSON: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("encode store: {0}")]
    Encode(serde_json::Error),
    #[error("write store {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: io::Error,
    },
}

/// One topic's freshly collected rows, as produced by the collector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicBatch {
    pub topic: String,
    pub papers: PaperRows,
}

/// Two-level keyed record store, persisted as a single JSON document.
/// Topic order is insertion order and drives report section order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
    pub topics: IndexMap<String, PaperRows>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from `path`. A missing file or empty content yields an
    /// empty store. Non-empty content that fails to parse is an error --
    /// corrupt history must never be silently replaced by an empty store.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(err) => {
                return Err(StoreError::Read {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(Self::new());
        }
        let topics = serde_json::from_str(&raw).map_err(|err| StoreError::Corrupt {
            path: path.to_path_buf(),
            source: err,
        })?;
        Ok(Self { topics })
    }

    /// Merge collected batches into the store. An existing topic is
    /// updated key-by-key (last writer wins, no conflict detection); a new
    /// topic is inserted wholesale. This is the sole place new data enters
    /// the persisted store.
    pub fn merge_batches(&mut self, batches: &[TopicBatch]) {
        for batch in batches {
            match self.topics.get_mut(&batch.topic) {
                Some(existing) => {
                    for (paper_id, row) in &batch.papers {
                        existing.insert(paper_id.clone(), row.clone());
                    }
                }
                None => {
                    self.topics.insert(batch.topic.clone(), batch.papers.clone());
                }
            }
        }
    }

    /// Serialize the full store and atomically replace `path`: write a
    /// temp sibling, then rename over the destination. serde_json keeps
    /// non-ASCII characters literal.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let data = serde_json::to_string(&self.topics).map_err(StoreError::Encode)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| StoreError::Write {
                    path: path.to_path_buf(),
                    source: err,
                })?;
            }
        }
        let tmp = tmp_sibling(path);
        fs::write(&tmp, data.as_bytes()).map_err(|err| StoreError::Write {
            path: tmp.clone(),
            source: err,
        })?;
        fs::rename(&tmp, path).map_err(|err| StoreError::Write {
            path: path.to_path_buf(),
            source: err,
        })
    }
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "store.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;

    fn batch(topic: &str, papers: &[(&str, &str)]) -> TopicBatch {
        TopicBatch {
            topic: topic.to_string(),
            papers: papers
                .iter()
                .map(|(id, row)| (id.to_string(), row.to_string()))
                .collect(),
        }
    }

    #[test]
    fn merge_inserts_new_topic_wholesale() {
        let mut store = RecordStore::new();
        store.merge_batches(&[batch("slam", &[("2508.00001", "|row|")])]);
        assert_eq!(store.topics.len(), 1);
        assert_eq!(store.topics["slam"]["2508.00001"], "|row|");
    }

    #[test]
    fn merge_is_idempotent() {
        let batches = [batch("slam", &[("2508.00001", "|row|")])];
        let mut once = RecordStore::new();
        once.merge_batches(&batches);
        let mut twice = once.clone();
        twice.merge_batches(&batches);
        assert_eq!(once, twice);
    }

    #[test]
    fn merge_is_last_writer_wins_per_key() {
        let mut store = RecordStore::new();
        store.merge_batches(&[batch("slam", &[("2508.00001", "|a|")])]);
        store.merge_batches(&[batch("slam", &[("2508.00001", "|b|")])]);
        assert_eq!(store.topics["slam"]["2508.00001"], "|b|");
    }

    #[test]
    fn merge_keeps_existing_keys_not_in_batch() {
        let mut store = RecordStore::new();
        store.merge_batches(&[batch("slam", &[("2508.00001", "|a|")])]);
        store.merge_batches(&[batch("slam", &[("2508.00002", "|b|")])]);
        assert_eq!(store.topics["slam"].len(), 2);
        assert_eq!(store.topics["slam"]["2508.00001"], "|a|");
    }

    #[test]
    fn merge_preserves_topic_insertion_order() {
        let mut store = RecordStore::new();
        store.merge_batches(&[batch("nerf", &[]), batch("slam", &[])]);
        let order: Vec<&String> = store.topics.keys().collect();
        assert_eq!(order, ["nerf", "slam"]);
    }
}
