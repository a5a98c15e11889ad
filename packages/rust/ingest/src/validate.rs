//! Referential validation across the parsed batch.
//!
//! Every alternate-language and related-document reference must name an
//! item ID present in the same batch. A dangling reference fails the
//! whole import before any linking or store mutation happens.

use std::collections::HashSet;

use polidoc_shared::{PolidocError, Result};

use crate::rows::ImportEntry;

/// Check every cross-reference in the batch.
pub fn check_references(entries: &[ImportEntry]) -> Result<()> {
    let ids: HashSet<&str> = entries
        .iter()
        .map(|import| import.entry.item_id.as_str())
        .collect();

    for import in entries {
        let item_id = &import.entry.item_id;
        for alt_id in &import.entry.alt_language_ids {
            if !ids.contains(alt_id.as_str()) {
                return Err(PolidocError::row(format!(
                    "[Item {item_id}] alternate language reference {alt_id:?} not found"
                )));
            }
        }
        for related_id in &import.entry.related_ids {
            if !ids.contains(related_id.as_str()) {
                return Err(PolidocError::row(format!(
                    "[Item {item_id}] related document {related_id:?} not found"
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::import_entry;

    #[test]
    fn valid_references_pass() {
        let mut a = import_entry("A", &["en"], &["B"]);
        a.entry.related_ids = vec!["B".into()];
        let entries = vec![a, import_entry("B", &["fr"], &["A"])];
        check_references(&entries).expect("valid batch");
    }

    #[test]
    fn self_reference_passes() {
        let entries = vec![import_entry("A", &["en"], &["A"])];
        check_references(&entries).expect("self reference");
    }

    #[test]
    fn dangling_alternate_reference_fails() {
        let entries = vec![import_entry("A", &["en"], &["GHOST"])];
        let err = check_references(&entries).unwrap_err();
        assert!(err.to_string().contains("alternate language"));
        assert!(err.to_string().contains("GHOST"));
    }

    #[test]
    fn dangling_related_reference_fails() {
        let mut a = import_entry("A", &["en"], &[]);
        a.entry.related_ids = vec!["MISSING".into()];
        let err = check_references(&[a]).unwrap_err();
        assert!(err.to_string().contains("related document"));
        assert!(err.to_string().contains("MISSING"));
    }
}
