//! Spreadsheet text rendering
//!
//! Renders every sheet of a workbook as a labeled CSV-style dump so the
//! model sees tabular data with its sheet context:
//!
//! ```text
//! === Sheet: Damages ===
//! item,amount
//! lost wages,42000
//!
//! === Sheet: Timeline ===
//! ...
//! ```

use crate::ExtractError;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

pub(crate) fn extract_workbook(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ExtractError::Spreadsheet(format!("not a workbook: {e}")))?;

    let names = workbook.sheet_names().to_vec();
    let mut out = String::new();

    for (idx, name) in names.iter().enumerate() {
        if idx > 0 {
            out.push_str("\n\n");
        }
        out.push_str(&format!("=== Sheet: {name} ===\n"));

        let range = workbook
            .worksheet_range(name)
            .map_err(|e| ExtractError::Spreadsheet(format!("sheet '{name}': {e}")))?;

        for row in range.rows() {
            let line = row.iter().map(cell_text).collect::<Vec<_>>().join(",");
            out.push_str(&line);
            out.push('\n');
        }
    }

    Ok(out)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_are_rejected() {
        let result = extract_workbook(b"name,amount\nalice,42\n");
        assert!(matches!(result, Err(ExtractError::Spreadsheet(_))));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let result = extract_workbook(b"");
        assert!(matches!(result, Err(ExtractError::Spreadsheet(_))));
    }

    #[test]
    fn test_cell_text_empty_cell() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("x".into())), "x");
        assert_eq!(cell_text(&Data::Float(1.5)), "1.5");
    }
}
