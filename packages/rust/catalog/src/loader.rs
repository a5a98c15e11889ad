//! Diff-preview and atomic bulk replacement.
//!
//! Every import replaces the entries table wholesale. The diff compares
//! the incoming batch against the live table by structural equality of
//! normalized entries; the swap stages the batch and replaces the live
//! rows inside a single immediate transaction, so readers never observe
//! a partial catalog and the FTS index stays trigger-synchronized.

use std::collections::HashMap;

use libsql::{Transaction, TransactionBehavior, params};
use polidoc_shared::{Entry, Result};

use crate::store::{Catalog, encode_list, encode_regions, storage_err};

/// Outcome classes of reconciling an incoming batch against the live
/// catalog. Each list holds sorted item ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogDiff {
    pub new: Vec<String>,
    pub modified: Vec<String>,
    pub unmodified: Vec<String>,
    pub deleted: Vec<String>,
}

/// Classify each incoming entry as new, modified, or unmodified, and each
/// live-only entry as deleted. Both sides must be normalized.
pub fn diff_entries(current: &[Entry], incoming: &[Entry]) -> CatalogDiff {
    let live: HashMap<&str, &Entry> = current
        .iter()
        .map(|entry| (entry.item_id.as_str(), entry))
        .collect();

    let mut diff = CatalogDiff::default();
    for entry in incoming {
        match live.get(entry.item_id.as_str()) {
            None => diff.new.push(entry.item_id.clone()),
            Some(existing) if *existing == entry => diff.unmodified.push(entry.item_id.clone()),
            Some(_) => diff.modified.push(entry.item_id.clone()),
        }
    }

    let incoming_ids: HashMap<&str, ()> = incoming
        .iter()
        .map(|entry| (entry.item_id.as_str(), ()))
        .collect();
    for entry in current {
        if !incoming_ids.contains_key(entry.item_id.as_str()) {
            diff.deleted.push(entry.item_id.clone());
        }
    }

    diff.new.sort();
    diff.modified.sort();
    diff.unmodified.sort();
    diff.deleted.sort();
    diff
}

impl Catalog {
    /// Replace the whole entries table with `entries`, atomically.
    pub async fn replace_all(&self, entries: &[Entry]) -> Result<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await
            .map_err(storage_err)?;

        match stage_and_swap(&tx, entries).await {
            Ok(()) => {
                tx.commit().await.map_err(storage_err)?;
                tracing::info!(entries = entries.len(), "replaced catalog entries");
                Ok(())
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }
}

async fn stage_and_swap(tx: &Transaction, entries: &[Entry]) -> Result<()> {
    tx.execute("DELETE FROM entries_staging", params![])
        .await
        .map_err(storage_err)?;

    for entry in entries {
        insert_staging(tx, entry).await?;
    }

    // Deleting and refilling the live table fires the FTS triggers.
    tx.execute("DELETE FROM entries", params![])
        .await
        .map_err(storage_err)?;
    tx.execute(
        "INSERT INTO entries SELECT * FROM entries_staging",
        params![],
    )
    .await
    .map_err(storage_err)?;
    tx.execute("DELETE FROM entries_staging", params![])
        .await
        .map_err(storage_err)?;
    Ok(())
}

async fn insert_staging(tx: &Transaction, entry: &Entry) -> Result<()> {
    let start_date = entry.start_date.map(|d| d.format("%Y-%m-%d").to_string());
    let end_date = entry.end_date.map(|d| d.format("%Y-%m-%d").to_string());

    tx.execute(
        "INSERT INTO entries_staging (
            id, title, authors, url, org_publishers, org_doc_id, org_type, doc_type,
            abstract, youth_led, youth_led_details, keywords, regions,
            start_date, end_date, language, alt_language_ids, related_ids
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        params![
            entry.item_id.as_str(),
            entry.title.as_str(),
            entry.authors.as_str(),
            entry.url.as_str(),
            encode_list(&entry.org_publishers),
            entry.org_doc_id.as_str(),
            entry.org_type.as_str(),
            entry.doc_type.as_str(),
            entry.abstract_text.as_str(),
            entry.youth_led.as_str(),
            entry.youth_led_details.as_str(),
            encode_list(&entry.keywords),
            encode_regions(&entry.regions),
            start_date.as_deref(),
            end_date.as_deref(),
            entry.language.as_str(),
            encode_list(&entry.alt_language_ids),
            encode_list(&entry.related_ids),
        ],
    )
    .await
    .map_err(storage_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{entry, test_catalog};

    #[test]
    fn diff_classifies_all_outcomes() {
        let current = vec![
            entry("YPS-001", "Unchanged", "en"),
            entry("YPS-002", "Old title", "en"),
            entry("YPS-003", "Going away", "en"),
        ];
        let incoming = vec![
            entry("YPS-001", "Unchanged", "en"),
            entry("YPS-002", "New title", "en"),
            entry("YPS-004", "Brand new", "fr"),
        ];

        let diff = diff_entries(&current, &incoming);
        assert_eq!(diff.new, vec!["YPS-004"]);
        assert_eq!(diff.modified, vec!["YPS-002"]);
        assert_eq!(diff.unmodified, vec!["YPS-001"]);
        assert_eq!(diff.deleted, vec!["YPS-003"]);
    }

    #[test]
    fn diff_is_order_insensitive_on_normalized_entries() {
        let mut a = entry("YPS-001", "T", "en");
        a.keywords = vec!["peace".into(), "youth".into()];
        a.normalize();
        let mut b = entry("YPS-001", "T", "en");
        b.keywords = vec!["youth".into(), "peace".into()];
        b.normalize();

        let diff = diff_entries(&[a], &[b]);
        assert_eq!(diff.unmodified, vec!["YPS-001"]);
        assert!(diff.modified.is_empty());
    }

    #[test]
    fn diff_of_empty_incoming_deletes_everything() {
        let current = vec![entry("YPS-001", "A", "en"), entry("YPS-002", "B", "fr")];
        let diff = diff_entries(&current, &[]);
        assert_eq!(diff.deleted, vec!["YPS-001", "YPS-002"]);
        assert!(diff.new.is_empty());
    }

    #[tokio::test]
    async fn replace_all_swaps_the_table() {
        let catalog = test_catalog().await;
        catalog
            .replace_all(&[entry("YPS-001", "A", "en"), entry("YPS-002", "B", "fr")])
            .await
            .expect("first load");

        catalog
            .replace_all(&[entry("YPS-002", "B revised", "fr"), entry("YPS-003", "C", "en")])
            .await
            .expect("second load");

        let entries = catalog.get_all_entries().await.expect("read");
        let ids: Vec<&str> = entries.iter().map(|e| e.item_id.as_str()).collect();
        assert_eq!(ids, vec!["YPS-002", "YPS-003"]);
        assert_eq!(entries[0].title, "B revised");
    }

    #[tokio::test]
    async fn replace_all_with_empty_batch_clears_the_table() {
        let catalog = test_catalog().await;
        catalog
            .replace_all(&[entry("YPS-001", "A", "en")])
            .await
            .expect("load");
        catalog.replace_all(&[]).await.expect("clear");
        assert!(catalog.get_all_entries().await.expect("read").is_empty());
    }
}
