/// CSV loader for ROLL tables
///
/// Reads a comma-separated file with a header row into a `Table`. Column
/// names are trimmed so that `" ROLL "` in a hand-edited header still
/// matches. Cells are kept as raw text; numeric interpretation is left to
/// the extractor.

use std::fs;
use std::path::Path;

use crate::model::{Row, SequenceError, Table};

// ============================================================================
// Public API
// ============================================================================

/// Load a table from a CSV file on disk.
///
/// Returns `SourceUnavailable` if the file does not exist and
/// `EmptySource` if it has no header line.
pub fn load_table(path: &Path) -> Result<Table, SequenceError> {
    if !path.exists() {
        return Err(SequenceError::SourceUnavailable(path.to_path_buf()));
    }

    let text = fs::read_to_string(path)?;
    parse_table(&text)?.ok_or_else(|| SequenceError::EmptySource(path.to_path_buf()))
}

/// Parse CSV text into a table.
///
/// Returns `Ok(None)` when the text holds no header line at all.
pub fn parse_table(text: &str) -> Result<Option<Table>, SequenceError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = split_records(text).into_iter();

    let Some(header) = records.next() else {
        return Ok(None);
    };

    let columns: Vec<String> = header
        .fields
        .into_iter()
        .map(|name| name.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in records {
        if record.fields.len() != columns.len() {
            return Err(SequenceError::RaggedRow {
                line: record.line,
                expected: columns.len(),
                found: record.fields.len(),
            });
        }
        rows.push(Row::new(record.fields));
    }

    Table::new(columns, rows).map(Some)
}

// ============================================================================
// Record splitting
// ============================================================================

/// One logical CSV record and the 1-based line it starts on.
#[derive(Debug)]
struct Record {
    line: usize,
    fields: Vec<String>,
}

/// Split CSV text into records.
///
/// Handles double-quoted fields with embedded commas, line breaks and `""`
/// escapes. An unquoted `\n` or `\r\n` ends a record. Unquoted fields are
/// returned verbatim, including surrounding spaces. Blank lines are dropped.
fn split_records(text: &str) -> Vec<Record> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut line = 1;
    let mut start_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
                quoted = true;
            }
            '\n' if in_quotes => {
                field.push(c);
                line += 1;
            }
            '\r' if !in_quotes && matches!(chars.peek(), Some('\n') | None) => {}
            '\n' => {
                fields.push(std::mem::take(&mut field));
                push_record(&mut records, start_line, std::mem::take(&mut fields), quoted);
                quoted = false;
                line += 1;
                start_line = line;
            }
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
            }
            _ => field.push(c),
        }
    }

    if quoted || !fields.is_empty() || !field.is_empty() {
        fields.push(field);
        push_record(&mut records, start_line, fields, quoted);
    }

    records
}

fn push_record(records: &mut Vec<Record>, line: usize, fields: Vec<String>, quoted: bool) {
    let blank = !quoted && fields.len() == 1 && fields[0].trim().is_empty();
    if !blank {
        records.push(Record { line, fields });
    }
}

// ============================================================================
// Tests
// ============================================================================
