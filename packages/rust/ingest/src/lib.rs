//! Spreadsheet ingestion for Polidoc.
//!
//! Turns an uploaded xlsx workbook into a validated batch of catalog
//! entries:
//!
//! 1. [`workbook`] — read the data sheet into text rows
//! 2. [`columns`] — map the header row to column roles
//! 3. [`rows`] — extract one candidate entry per data row, applying the
//!    [`heuristics`] for youth-led status, regions, and dates
//! 4. [`validate`] — referential checks across the batch
//! 5. [`linker`] — language assignment and alternate-set closure
//!
//! Any hard failure aborts the whole batch; data-quality findings travel
//! as nits on the resulting [`ImportBatch`].

pub mod columns;
pub mod heuristics;
pub mod linker;
pub mod rows;
pub mod validate;
pub mod workbook;

#[cfg(test)]
pub(crate) mod testutil;

use polidoc_shared::{Entry, Result};

pub use rows::{ImportEntry, ParsedRows};

/// A fully parsed, validated, and linked batch ready for reconciliation.
#[derive(Debug, Clone)]
pub struct ImportBatch {
    /// Name of the sheet the data came from.
    pub sheet_name: String,
    /// Normalized entries, one per usable data row.
    pub entries: Vec<Entry>,
    /// Non-fatal data-quality findings, in row order.
    pub nits: Vec<String>,
}

/// Parse an xlsx workbook held in memory.
pub fn parse_workbook(bytes: &[u8], sheet_marker: &str) -> Result<ImportBatch> {
    let (sheet_name, rows) = workbook::load_rows(bytes, sheet_marker)?;
    parse_sheet(sheet_name, &rows)
}

/// Run the full pipeline over already-extracted text rows, header first.
pub fn parse_sheet(sheet_name: String, sheet_rows: &[Vec<String>]) -> Result<ImportBatch> {
    let ParsedRows { mut entries, nits } = rows::parse_rows(sheet_rows)?;
    validate::check_references(&entries)?;
    linker::link_languages(&mut entries)?;

    let mut batch: Vec<Entry> = entries.into_iter().map(|import| import.entry).collect();
    for entry in &mut batch {
        entry.normalize();
    }

    tracing::info!(
        sheet = sheet_name,
        entries = batch.len(),
        nits = nits.len(),
        "parsed import batch"
    );

    Ok(ImportBatch {
        sheet_name,
        entries: batch,
        nits,
    })
}
