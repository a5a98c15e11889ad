//! Shared fixtures for the parsing pipeline tests.

use chrono::NaiveDate;
use polidoc_shared::{Entry, Region, YouthLed};

use crate::rows::ImportEntry;

/// A complete, realistic header row in canonical column order.
pub(crate) fn full_header() -> Vec<String> {
    [
        "Item",
        "Author(s)",
        "Year",
        "Title",
        "Org / Publisher",
        "Doc #",
        "Day / Month",
        "URL",
        "Languages available",
        "Alternate Languages",
        "Related Documents",
        "Youth-led/ authored",
        "Abstract/ Exec Summary",
        "Type of org",
        "Type of document",
        "Keywords",
        "East and Southern Africa",
        "East and Central Asia",
        "Southeast Asia and the Pacific",
        "Europe and Eurasia",
        "Latin America and the Caribbean",
        "Middle East and North Africa",
        "North America",
        "South Asia",
        "West and Central Africa",
        "Global",
        "N/A",
    ]
    .map(String::from)
    .to_vec()
}

/// Build a data row by naming cells per header label; unnamed cells are
/// blank. Panics on a label missing from [`full_header`].
pub(crate) fn sheet_row(cells: &[(&str, &str)]) -> Vec<String> {
    let header = full_header();
    let mut row = vec![String::new(); header.len()];
    for (label, value) in cells {
        let index = header
            .iter()
            .position(|h| h == label)
            .unwrap_or_else(|| panic!("no column labeled {label:?}"));
        row[index] = (*value).to_string();
    }
    row
}

/// A minimal parsed entry for linker and validator tests.
pub(crate) fn import_entry(
    item_id: &str,
    language_candidates: &[&str],
    alt_language_ids: &[&str],
) -> ImportEntry {
    ImportEntry {
        entry: Entry {
            item_id: item_id.to_string(),
            title: format!("Title of {item_id}"),
            authors: "Author".into(),
            url: format!("https://example.org/{item_id}"),
            org_publishers: vec!["Publisher".into()],
            org_doc_id: String::new(),
            org_type: "NGO".into(),
            doc_type: "Report".into(),
            abstract_text: String::new(),
            youth_led: YouthLed::Yes,
            youth_led_details: "Yes".into(),
            keywords: vec![],
            regions: vec![Region::Global],
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2020, 1, 1),
            language: String::new(),
            alt_language_ids: alt_language_ids.iter().map(|s| s.to_string()).collect(),
            related_ids: vec![],
        },
        language_candidates: language_candidates.iter().map(|s| s.to_string()).collect(),
    }
}
