/// Presentation of extraction results.
///
/// Everything here is driven only by the `(row, group_id)` pairs of an
/// `OutputTable`; the extractor knows nothing about rendering.
///
/// Submodules:
/// - `render` — group banding and the plain-text table shown on the console.
/// - `xlsx` — single-sheet spreadsheet export.

pub mod render;
pub mod xlsx;

/// File name used for the spreadsheet when no output path is configured.
pub const XLSX_FILE_NAME: &str = "processed_data.xlsx";

/// MIME type to serve the spreadsheet under.
pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Name of the only worksheet in the export.
pub const SHEET_NAME: &str = "Sheet1";
