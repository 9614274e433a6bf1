//! Run detection over the ROLL column.
//!
//! A run is a maximal block of consecutive rows whose adjacent ROLL values
//! differ by at most `diff`. Runs of at least `recurrence` rows become
//! groups, numbered from zero in discovery order.
//!
//! The scan is a single forward pass with two cursor rules:
//! - on an accepted run the cursor jumps past the run's last row, so no row
//!   is ever emitted twice;
//! - on a rejected run the cursor moves forward by exactly one row, so a
//!   run spoiled by an outlier near its start can still be found from the
//!   next position.
//!
//! Rows are addressed by position throughout. Duplicate ROLL values are
//! therefore harmless.

use crate::model::{GROUP_COLUMN, OutputTable, Run, SequenceError, Table, TaggedRow};

// ---------------------------------------------------------------------------
// Run detection
// ---------------------------------------------------------------------------

/// Returns the last position of the run that starts at `start`.
fn run_end(values: &[f64], start: usize, diff: f64) -> usize {
    let mut end = start;
    while end + 1 < values.len() && (values[end + 1] - values[end]).abs() <= diff {
        end += 1;
    }
    end
}

/// Finds every qualifying run in `values`, in table order.
///
/// `diff` must be positive and `recurrence` at least 1; both are checked at
/// the parameter boundary (`ExtractionParams::new`), not here.
pub fn find_runs(values: &[f64], diff: f64, recurrence: usize) -> Vec<Run> {
    debug_assert!(diff > 0.0, "diff must be positive");
    debug_assert!(recurrence >= 1, "recurrence must be at least 1");

    let mut runs = Vec::new();
    let mut cursor = 0;

    while cursor < values.len() {
        let end = run_end(values, cursor, diff);
        let len = end - cursor + 1;

        if len >= recurrence {
            runs.push(Run {
                group_id: runs.len(),
                start: cursor,
                end,
            });
            cursor = end + 1;
        } else {
            cursor += 1;
        }
    }

    runs
}

// ---------------------------------------------------------------------------
// Output assembly
// ---------------------------------------------------------------------------

/// Extracts every qualifying run from `table` and flattens them into a
/// tagged output table.
///
/// Fails with `MissingColumn` when the table has no ROLL column and with
/// `MalformedValue` when a ROLL cell is not numeric. An empty result is a
/// valid outcome meaning no run qualified.
///
/// A `Group` column already present in the input is replaced: its cells are
/// dropped and the computed group id becomes the last column.
pub fn extract(
    table: &Table,
    diff: f64,
    recurrence: usize,
) -> Result<OutputTable, SequenceError> {
    let values = table.roll_values()?;
    let runs = find_runs(&values, diff, recurrence);
    let stale_group = table.column_index(GROUP_COLUMN);

    let rows = runs
        .iter()
        .flat_map(|run| {
            run.positions().map(move |position| {
                let mut cells = table.rows[position].cells.clone();
                if let Some(column) = stale_group.filter(|&c| c < cells.len()) {
                    cells.remove(column);
                }
                TaggedRow {
                    source_index: position,
                    group_id: run.group_id,
                    cells,
                }
            })
        })
        .collect();

    let mut columns: Vec<String> = table
        .columns
        .iter()
        .filter(|name| *name != GROUP_COLUMN)
        .cloned()
        .collect();
    columns.push(GROUP_COLUMN.to_string());

    Ok(OutputTable { columns, rows, runs })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
