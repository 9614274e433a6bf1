use std::path::Path;

use rust_xlsxwriter::{Color, Format, Workbook, Worksheet, XlsxError};

use crate::export::SHEET_NAME;
use crate::export::render::band_for;
use crate::model::{OutputTable, SequenceError};

/// Writes the output table to an `.xlsx` file at `path`.
pub fn write_workbook(output: &OutputTable, path: &Path) -> Result<(), SequenceError> {
    let mut workbook = build_workbook(output)?;
    workbook.save(path)?;
    Ok(())
}

/// Serializes the output table to `.xlsx` bytes, for callers that stream
/// the file instead of saving it.
pub fn to_xlsx_bytes(output: &OutputTable) -> Result<Vec<u8>, SequenceError> {
    let mut workbook = build_workbook(output)?;
    Ok(workbook.save_to_buffer()?)
}

fn build_workbook(output: &OutputTable) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let band_formats = [
        Format::new().set_background_color(Color::RGB(band_for(0).rgb())),
        Format::new().set_background_color(Color::RGB(band_for(1).rgb())),
    ];

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    sheet.set_freeze_panes(1, 0)?;

    for (col, name) in output.columns.iter().enumerate() {
        sheet.write_string_with_format(0, col_num(col)?, name, &header_format)?;
    }

    for (i, row) in output.rows.iter().enumerate() {
        let row_num = row_num(i + 1)?;
        let format = &band_formats[row.group_id % 2];

        for (col, cell) in row.cells.iter().enumerate() {
            write_cell(sheet, row_num, col_num(col)?, cell, format)?;
        }
        let group_col = col_num(row.cells.len())?;
        sheet.write_number_with_format(row_num, group_col, row.group_id as f64, format)?;
    }

    Ok(workbook)
}

/// Numbers go in as numbers so the sheet sorts and sums them; everything
/// else as text.
fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &str,
    format: &Format,
) -> Result<(), XlsxError> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        sheet.write_blank(row, col, format)?;
    } else if let Some(n) = trimmed.parse::<f64>().ok().filter(|n| n.is_finite()) {
        sheet.write_number_with_format(row, col, n, format)?;
    } else {
        sheet.write_string_with_format(row, col, cell, format)?;
    }
    Ok(())
}

fn row_num(i: usize) -> Result<u32, XlsxError> {
    u32::try_from(i).map_err(|_| XlsxError::RowColumnLimitError)
}

fn col_num(i: usize) -> Result<u16, XlsxError> {
    u16::try_from(i).map_err(|_| XlsxError::RowColumnLimitError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaggedRow;

    fn sample_output() -> OutputTable {
        OutputTable {
            columns: vec!["ROLL".into(), "NAME".into(), "Group".into()],
            rows: vec![
                TaggedRow { source_index: 0, group_id: 0, cells: vec!["1".into(), "ann".into()] },
                TaggedRow { source_index: 1, group_id: 0, cells: vec!["2".into(), "".into()] },
                TaggedRow { source_index: 4, group_id: 1, cells: vec!["9".into(), "cy".into()] },
            ],
            runs: Vec::new(),
        }
    }

    #[test]
    fn test_bytes_are_a_zip_container() {
        let bytes = to_xlsx_bytes(&sample_output()).unwrap();
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[..2], b"PK", "xlsx files are zip archives");
    }

    #[test]
    fn test_empty_output_still_exports_header() {
        let mut output = sample_output();
        output.rows.clear();
        let bytes = to_xlsx_bytes(&output).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_write_workbook_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed_data.xlsx");
        write_workbook(&sample_output(), &path).unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
