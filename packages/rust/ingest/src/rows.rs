//! Row-level extraction: one spreadsheet data row in, one candidate entry
//! out.
//!
//! Rules here are deliberately lenient about data quality (nits, defaults)
//! and strict about identity: a duplicate item ID fails the whole batch.

use std::collections::HashSet;

use polidoc_shared::{Entry, PolidocError, Region, Result, YouthLed, languages};

use crate::columns::{self, ColumnRole};
use crate::heuristics;

/// A parsed row before language resolution. `language_candidates` holds
/// the registry codes from the "Languages available" column; the linker
/// turns them into a single assigned language per entry.
#[derive(Debug, Clone)]
pub struct ImportEntry {
    pub entry: Entry,
    pub language_candidates: Vec<String>,
}

/// Outcome of parsing every data row under a mapped header.
#[derive(Debug, Default)]
pub struct ParsedRows {
    pub entries: Vec<ImportEntry>,
    pub nits: Vec<String>,
}

/// Values removed from every multi-value cell. `"0"` is the sheet's
/// explicit "none" sentinel.
fn is_sentinel(part: &str) -> bool {
    part.is_empty() || part == "0"
}

/// Split a multi-value cell on `separator`, trimming parts and dropping
/// empties and `"0"` sentinels.
pub fn split_multi(raw: &str, separator: char) -> Vec<String> {
    raw.split(separator)
        .map(str::trim)
        .filter(|part| !is_sentinel(part))
        .map(String::from)
        .collect()
}

/// Parse all rows below the header into candidate entries.
///
/// Rows whose Title is blank or `"0"` are skipped outright. A duplicate
/// item ID or an unrecognized language name fails the batch.
pub fn parse_rows(rows: &[Vec<String>]) -> Result<ParsedRows> {
    let header = rows
        .first()
        .ok_or_else(|| PolidocError::malformed("sheet has no header row"))?;
    let mapping = columns::map_header(header)?;

    let mut parsed = ParsedRows::default();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for (row_number, row) in rows.iter().enumerate().skip(1) {
        let cell = |role: ColumnRole| -> &str {
            mapping
                .get(&role)
                .and_then(|&index| row.get(index))
                .map(String::as_str)
                .unwrap_or("")
                .trim()
        };

        let title = cell(ColumnRole::Title).to_string();
        if is_sentinel(&title) {
            continue;
        }

        let item_id = cell(ColumnRole::ItemId).to_string();
        if item_id.is_empty() {
            return Err(PolidocError::row(format!(
                "row {}: entry {title:?} has no item ID",
                row_number + 1
            )));
        }
        if !seen_ids.insert(item_id.clone()) {
            return Err(PolidocError::row(format!(
                "duplicate item ID on row {}: {item_id}",
                row_number + 1
            )));
        }

        let org_doc_id = match cell(ColumnRole::DocNumber) {
            "N/A" => String::new(),
            other => other.to_string(),
        };

        let youth_led_details = cell(ColumnRole::YouthLed).to_string();
        let youth_led = heuristics::classify_youth_led(&youth_led_details);
        if youth_led == YouthLed::Unknown {
            parsed.nits.push(format!(
                "[Item {item_id}] unrecognized youth-led value {youth_led_details:?}"
            ));
        }

        let flags = Region::ALL.map(|region| (region, cell(ColumnRole::RegionFlag(region))));
        let (regions, region_defaulted) = heuristics::decode_regions(flags);
        if region_defaulted {
            parsed
                .nits
                .push(format!("[Item {item_id}] no region flags set, defaulting to N/A"));
        }

        let raw_year = cell(ColumnRole::Year);
        let raw_day_month = cell(ColumnRole::DayMonth);
        let dates = heuristics::resolve_dates(raw_year, raw_day_month);
        if dates.nit {
            parsed.nits.push(format!(
                "[Item {item_id}] cannot interpret date {raw_year:?} / {raw_day_month:?}"
            ));
        }

        let mut language_candidates = Vec::new();
        for name in cell(ColumnRole::Languages)
            .split(',')
            .map(str::trim)
            .filter(|part| !is_sentinel(part))
        {
            match languages::code_for(name) {
                Some(code) => {
                    let code = code.to_string();
                    if !language_candidates.contains(&code) {
                        language_candidates.push(code);
                    }
                }
                None => {
                    return Err(PolidocError::row(format!(
                        "[Item {item_id}] unknown language {name:?}"
                    )));
                }
            }
        }

        let entry = Entry {
            item_id,
            title,
            authors: cell(ColumnRole::Authors).to_string(),
            url: cell(ColumnRole::Url).to_string(),
            org_publishers: split_multi(cell(ColumnRole::OrgPublisher), ';'),
            org_doc_id,
            org_type: cell(ColumnRole::OrgType).to_string(),
            doc_type: cell(ColumnRole::DocType).to_string(),
            abstract_text: cell(ColumnRole::Abstract).to_string(),
            youth_led,
            youth_led_details,
            keywords: split_multi(cell(ColumnRole::Keywords), ';'),
            regions,
            start_date: dates.start,
            end_date: dates.end,
            language: String::new(),
            alt_language_ids: split_multi(cell(ColumnRole::AlternateLanguages), ','),
            related_ids: split_multi(cell(ColumnRole::RelatedDocuments), ','),
        };

        parsed.entries.push(ImportEntry {
            entry,
            language_candidates,
        });
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{full_header, sheet_row};

    #[test]
    fn split_multi_drops_sentinels() {
        assert_eq!(
            split_multi("UNOY; 0 ; UNDP;; Search for Common Ground", ';'),
            vec!["UNOY", "UNDP", "Search for Common Ground"]
        );
        assert_eq!(split_multi("0", ','), Vec::<String>::new());
        assert_eq!(split_multi("", ';'), Vec::<String>::new());
    }

    #[test]
    fn blank_and_sentinel_titles_are_skipped() {
        let rows = vec![
            full_header(),
            sheet_row(&[("Item", "YPS-001"), ("Title", ""), ("Languages available", "English")]),
            sheet_row(&[("Item", "YPS-002"), ("Title", "0"), ("Languages available", "English")]),
            sheet_row(&[
                ("Item", "YPS-003"),
                ("Title", "Kept"),
                ("Languages available", "English"),
            ]),
        ];
        let parsed = parse_rows(&rows).expect("parse");
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].entry.item_id, "YPS-003");
    }

    #[test]
    fn duplicate_item_id_fails_the_batch() {
        let rows = vec![
            full_header(),
            sheet_row(&[("Item", "YPS-001"), ("Title", "First"), ("Languages available", "English")]),
            sheet_row(&[("Item", "YPS-001"), ("Title", "Again"), ("Languages available", "English")]),
        ];
        let err = parse_rows(&rows).unwrap_err();
        assert!(err.to_string().contains("duplicate item ID"));
        assert!(err.to_string().contains("YPS-001"));
    }

    #[test]
    fn doc_number_na_becomes_empty() {
        let rows = vec![
            full_header(),
            sheet_row(&[
                ("Item", "YPS-001"),
                ("Title", "T"),
                ("Doc #", "N/A"),
                ("Languages available", "English"),
            ]),
            sheet_row(&[
                ("Item", "YPS-002"),
                ("Title", "T2"),
                ("Doc #", "A/RES/2250"),
                ("Languages available", "English"),
            ]),
        ];
        let parsed = parse_rows(&rows).expect("parse");
        assert_eq!(parsed.entries[0].entry.org_doc_id, "");
        assert_eq!(parsed.entries[1].entry.org_doc_id, "A/RES/2250");
    }

    #[test]
    fn unknown_language_fails_the_batch() {
        let rows = vec![
            full_header(),
            sheet_row(&[
                ("Item", "YPS-001"),
                ("Title", "T"),
                ("Languages available", "Klingon"),
            ]),
        ];
        let err = parse_rows(&rows).unwrap_err();
        assert!(err.to_string().contains("unknown language"));
        assert!(err.to_string().contains("YPS-001"));
    }

    #[test]
    fn language_names_resolve_to_codes() {
        let rows = vec![
            full_header(),
            sheet_row(&[
                ("Item", "YPS-001"),
                ("Title", "T"),
                ("Languages available", "English, français"),
            ]),
        ];
        let parsed = parse_rows(&rows).expect("parse");
        assert_eq!(parsed.entries[0].language_candidates, vec!["en", "fr"]);
    }

    #[test]
    fn region_and_youth_led_nits() {
        let rows = vec![
            full_header(),
            sheet_row(&[
                ("Item", "YPS-001"),
                ("Title", "T"),
                ("Languages available", "English"),
                ("Youth-led/ authored", "Partially"),
            ]),
        ];
        let parsed = parse_rows(&rows).expect("parse");
        let entry = &parsed.entries[0].entry;
        assert_eq!(entry.youth_led, YouthLed::Unknown);
        assert_eq!(entry.regions, vec![Region::NotApplicable]);
        assert!(parsed.nits.iter().any(|n| n.contains("youth-led")));
        assert!(parsed.nits.iter().any(|n| n.contains("region")));
    }

    #[test]
    fn region_flags_populate_entry() {
        let rows = vec![
            full_header(),
            sheet_row(&[
                ("Item", "YPS-001"),
                ("Title", "T"),
                ("Languages available", "English"),
                ("Youth-led/ authored", "Yes"),
                ("Global", "1"),
                ("South Asia", "1"),
            ]),
        ];
        let parsed = parse_rows(&rows).expect("parse");
        assert_eq!(
            parsed.entries[0].entry.regions,
            vec![Region::SouthAsia, Region::Global]
        );
    }
}
