//! Shared fixtures for catalog tests.

use chrono::NaiveDate;
use polidoc_shared::{Entry, Region, YouthLed};
use uuid::Uuid;

use crate::store::Catalog;

/// Create a temp-file catalog for testing.
pub(crate) async fn test_catalog() -> Catalog {
    let tmp = std::env::temp_dir().join(format!("polidoc_test_{}.db", Uuid::now_v7()));
    Catalog::open(&tmp).await.expect("open test db")
}

/// A normalized entry with sensible defaults.
pub(crate) fn entry(item_id: &str, title: &str, language: &str) -> Entry {
    Entry {
        item_id: item_id.to_string(),
        title: title.to_string(),
        authors: "Author".into(),
        url: format!("https://example.org/{item_id}"),
        org_publishers: vec!["Publisher".into()],
        org_doc_id: String::new(),
        org_type: "NGO".into(),
        doc_type: "Report".into(),
        abstract_text: "An abstract.".into(),
        youth_led: YouthLed::Yes,
        youth_led_details: "Yes".into(),
        keywords: vec![],
        regions: vec![Region::Global],
        start_date: NaiveDate::from_ymd_opt(2020, 1, 1),
        end_date: NaiveDate::from_ymd_opt(2020, 1, 1),
        language: language.to_string(),
        alt_language_ids: vec![item_id.to_string()],
        related_ids: vec![],
    }
}
