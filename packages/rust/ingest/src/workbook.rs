//! Thin workbook shim over calamine.
//!
//! Everything downstream of this module works on plain `Vec<Vec<String>>`
//! rows, so the parsing pipeline stays testable without xlsx fixtures.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use polidoc_shared::{PolidocError, Result};

/// Open an xlsx workbook from memory and return the rows of the data
/// sheet as text cells, along with the sheet's name.
///
/// The data sheet is the first sheet whose name contains `sheet_marker`
/// (case-insensitive); when none matches, the first sheet is used. A
/// workbook with no sheets is malformed.
pub fn load_rows(bytes: &[u8], sheet_marker: &str) -> Result<(String, Vec<Vec<String>>)> {
    let mut workbook = Xlsx::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| PolidocError::malformed(format!("cannot open workbook: {e}")))?;

    let names = workbook.sheet_names().to_vec();
    if names.is_empty() {
        return Err(PolidocError::malformed("workbook has no sheets"));
    }

    let marker = sheet_marker.trim().to_lowercase();
    let sheet = names
        .iter()
        .find(|name| !marker.is_empty() && name.to_lowercase().contains(&marker))
        .unwrap_or(&names[0])
        .clone();
    tracing::debug!(sheet, "selected data sheet");

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| PolidocError::malformed(format!("cannot read sheet {sheet:?}: {e}")))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    Ok((sheet, rows))
}

/// Render a cell as the text the row parser expects. Numeric cells drop a
/// trailing `.0`, date cells render as ISO dates, error cells read blank.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.date().format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}
