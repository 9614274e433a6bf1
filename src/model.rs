/// Core data types for the ROLL sequence extraction service.
///
/// This module defines the shared domain model imported by all other modules:
/// the input table, the runs found in it, the tagged output table, and the
/// error taxonomy. It contains no I/O.

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Name of the numeric key column scanned for sequences.
pub const ROLL_COLUMN: &str = "ROLL";

/// Name of the column appended to the output carrying each row's group id.
pub const GROUP_COLUMN: &str = "Group";

// ---------------------------------------------------------------------------
// Input table
// ---------------------------------------------------------------------------

/// One data row of the input table.
///
/// Cells are kept as the raw text read from the source, aligned with the
/// enclosing table's column list. Only the ROLL cell is ever interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub cells: Vec<String>,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    pub fn get(&self, column: usize) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }
}

/// An ordered table of rows sharing one set of (unique) column names.
///
/// Row order is the caller-supplied table order and is significant: the
/// extractor scans positions, not sorted values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Builds a table, rejecting duplicate column names.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Result<Self, SequenceError> {
        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                return Err(SequenceError::DuplicateColumn(name.clone()));
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `name` in the column list, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Parses the ROLL column into numbers, in table order.
    ///
    /// Fails with `MissingColumn` if the table has no ROLL column (even when
    /// it has no rows), and with `MalformedValue` on the first cell that is
    /// not a finite number.
    pub fn roll_values(&self) -> Result<Vec<f64>, SequenceError> {
        let column = self
            .column_index(ROLL_COLUMN)
            .ok_or_else(|| SequenceError::MissingColumn(ROLL_COLUMN.to_string()))?;

        self.rows
            .iter()
            .enumerate()
            .map(|(row, r)| {
                let raw = r.get(column).unwrap_or("");
                match raw.trim().parse::<f64>() {
                    Ok(v) if v.is_finite() => Ok(v),
                    _ => Err(SequenceError::MalformedValue {
                        row,
                        column: ROLL_COLUMN.to_string(),
                        value: raw.to_string(),
                    }),
                }
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Runs and output
// ---------------------------------------------------------------------------

/// A qualifying run of table positions `[start, end]` (inclusive), tagged
/// with its zero-based group id in discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub group_id: usize,
    pub start: usize,
    pub end: usize,
}

impl Run {
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Always false; a run holds at least its start row.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn positions(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}

/// An input row copied into the output, with its group id and original
/// table position.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedRow {
    pub source_index: usize,
    pub group_id: usize,
    pub cells: Vec<String>,
}

/// The flattened extraction result: every qualifying run's rows in emission
/// order. `columns` is the input column list followed by `Group`; the group
/// id itself lives on each `TaggedRow`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutputTable {
    pub columns: Vec<String>,
    pub rows: Vec<TaggedRow>,
    pub runs: Vec<Run>,
}

impl OutputTable {
    /// Total emitted rows; the metric reported back to the user.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn group_count(&self) -> usize {
        self.runs.len()
    }

    /// Column index of the ROLL field within `columns`, if any.
    pub fn roll_column(&self) -> Option<usize> {
        self.columns.iter().position(|c| c == ROLL_COLUMN)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Coarse classification of failures, used for logging and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The required key column is missing or ambiguous.
    Schema,
    /// The backing data file does not exist.
    SourceUnavailable,
    /// Anything else raised while loading, extracting or exporting.
    Processing,
}

/// Errors raised anywhere between reading the source file and writing the
/// export.
#[derive(Debug, Error)]
pub enum SequenceError {
    #[error("Column '{0}' not found in the table")]
    MissingColumn(String),

    #[error("Column '{0}' appears more than once in the header")]
    DuplicateColumn(String),

    #[error("The data file '{}' was not found", .0.display())]
    SourceUnavailable(PathBuf),

    #[error("The data file '{}' has no header row", .0.display())]
    EmptySource(PathBuf),

    /// `row` is the zero-based data row position.
    #[error("Row {row}: '{value}' is not a valid {column} value")]
    MalformedValue {
        row: usize,
        column: String,
        value: String,
    },

    /// `line` is the 1-based line number in the source text.
    #[error("Line {line}: expected {expected} fields, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid {name}: {value} (must be at least 1)")]
    InvalidParameter { name: &'static str, value: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XLSX error: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SequenceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SequenceError::MissingColumn(_) | SequenceError::DuplicateColumn(_) => {
                ErrorKind::Schema
            }
            SequenceError::SourceUnavailable(_) => ErrorKind::SourceUnavailable,
            _ => ErrorKind::Processing,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
