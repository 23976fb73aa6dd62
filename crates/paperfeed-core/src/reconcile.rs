//! Reconciler: merges collected batches into a store, or backfills missing
//! code links on a later pass (update mode).

use std::path::Path;

use log::{info, warn};
use thiserror::Error;

use crate::row::{self, RowError, NULL_SENTINEL};
use crate::store::{RecordStore, StoreError, TopicBatch};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("row {topic}/{paper_id}: {source}")]
    Row {
        topic: String,
        paper_id: String,
        source: RowError,
    },
}

/// Code-repository lookup keyed by paper id. Implemented by the
/// paperswithcode client in `paperfeed-net` and by mocks in tests.
pub trait CodeLinkResolver {
    fn resolve(&self, paper_id: &str) -> Result<Option<String>, String>;
}

/// Collect mode: merge freshly collected batches into the store at `path`
/// and persist it. No lookups are performed here.
pub fn merge_and_save(path: &Path, batches: &[TopicBatch]) -> Result<(), ReconcileError> {
    let mut store = RecordStore::load(path)?;
    store.merge_batches(batches);
    store.save(path)?;
    Ok(())
}

/// Update mode: re-resolve missing code links for rows already stored at
/// `path`, rewriting them in place, and persist the result.
pub fn update_links(path: &Path, resolver: &dyn CodeLinkResolver) -> Result<(), ReconcileError> {
    let mut store = RecordStore::load(path)?;
    update_store_links(&mut store, resolver)?;
    store.save(path)?;
    Ok(())
}

/// Walk every stored row: re-parse and normalize it, and for rows still
/// carrying the `|null|` sentinel issue one code-link lookup. A found link
/// replaces the sentinel cell; a lookup failure logs a warning and leaves
/// the row unchanged. Rows already holding a link are never looked up and
/// never modified beyond normalization.
pub fn update_store_links(
    store: &mut RecordStore,
    resolver: &dyn CodeLinkResolver,
) -> Result<(), ReconcileError> {
    for (topic, papers) in store.topics.iter_mut() {
        info!("updating code links for topic {topic}");
        for (paper_id, row_text) in papers.iter_mut() {
            let fields = row::decode(row_text).map_err(|source| ReconcileError::Row {
                topic: topic.clone(),
                paper_id: paper_id.clone(),
                source,
            })?;
            let mut next = fields.to_row();
            if next.contains(NULL_SENTINEL) {
                match resolver.resolve(paper_id) {
                    Ok(Some(url)) => {
                        info!("found code link for {paper_id}: {url}");
                        next = next.replace(NULL_SENTINEL, &format!("|**[link]({url})**|"));
                    }
                    Ok(None) => {}
                    Err(err) => {
                        warn!("code link lookup failed for {paper_id}: {err}");
                    }
                }
            }
            *row_text = next;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;

    struct FixedResolver {
        url: Option<String>,
    }

    impl CodeLinkResolver for FixedResolver {
        fn resolve(&self, _paper_id: &str) -> Result<Option<String>, String> {
            Ok(self.url.clone())
        }
    }

    fn store_with_row(row: &str) -> RecordStore {
        let mut store = RecordStore::new();
        store.merge_batches(&[TopicBatch {
            topic: "slam".to_string(),
            papers: [("2508.00001".to_string(), row.to_string())]
                .into_iter()
                .collect(),
        }]);
        store
    }

    #[test]
    fn sentinel_row_gains_link_when_resolved() {
        let mut store =
            store_with_row("|2025-08-25|**T**|A et.al.|[2508.00001](http://arxiv.org/abs/2508.00001)|null|\n");
        let resolver = FixedResolver {
            url: Some("https://github.com/a/b".to_string()),
        };
        update_store_links(&mut store, &resolver).expect("update");
        assert_eq!(
            store.topics["slam"]["2508.00001"],
            "|2025-08-25|**T**|A et.al.|[2508.00001](http://arxiv.org/abs/2508.00001)|**[link](https://github.com/a/b)**|\n"
        );
    }

    #[test]
    fn linked_row_is_never_replaced() {
        let row = "|2025-08-25|**T**|A et.al.|[2508.00001](http://arxiv.org/abs/2508.00001)|**[link](https://github.com/keep/me)**|\n";
        let mut store = store_with_row(row);
        let resolver = FixedResolver {
            url: Some("https://github.com/other/repo".to_string()),
        };
        update_store_links(&mut store, &resolver).expect("update");
        assert_eq!(store.topics["slam"]["2508.00001"], row);
    }

    #[test]
    fn unresolved_sentinel_row_is_left_as_is() {
        let row = "|2025-08-25|**T**|A et.al.|[2508.00001](http://arxiv.org/abs/2508.00001)|null|\n";
        let mut store = store_with_row(row);
        let resolver = FixedResolver { url: None };
        update_store_links(&mut store, &resolver).expect("update");
        assert_eq!(store.topics["slam"]["2508.00001"], row);
    }

    #[test]
    fn normalization_strips_version_suffix_in_place() {
        let mut store = store_with_row(
            "|2025-08-25|**T**|A et.al.|[2508.00001v3](http://arxiv.org/abs/2508.00001v3)|null|\n",
        );
        let resolver = FixedResolver { url: None };
        update_store_links(&mut store, &resolver).expect("update");
        assert_eq!(
            store.topics["slam"]["2508.00001"],
            "|2025-08-25|**T**|A et.al.|[2508.00001](http://arxiv.org/abs/2508.00001)|null|\n"
        );
    }

    #[test]
    fn malformed_row_fails_with_topic_and_id_context() {
        let mut store = store_with_row("- not a table row\n");
        let resolver = FixedResolver { url: None };
        let err = update_store_links(&mut store, &resolver).expect_err("must fail");
        let message = err.to_string();
        assert!(message.contains("slam"), "message: {message}");
        assert!(message.contains("2508.00001"), "message: {message}");
    }
}
