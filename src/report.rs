//! Processing Report
//!
//! Summary of one extraction run: what was read, which groups were found,
//! and where the export went. Serializable so the CLI can emit it as JSON
//! for scripts, and printable as a human-readable summary.

use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::model::{OutputTable, TaggedRow};
use crate::params::ExtractionParams;

// ============================================================================
// Report Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingReport {
    pub timestamp: String,
    pub source: String,
    pub diff: f64,
    pub recurrence: usize,
    pub total_rows: usize,
    pub emitted_rows: usize,
    pub group_count: usize,
    pub groups: Vec<GroupSummary>,
    pub export_path: Option<String>,
}

/// One group as it appears in the report. Row numbers are zero-based table
/// positions; `end_row` is inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub group_id: usize,
    pub start_row: usize,
    pub end_row: usize,
    pub len: usize,
    pub first_roll: Option<String>,
    pub last_roll: Option<String>,
}

// ============================================================================
// Building
// ============================================================================

impl ProcessingReport {
    pub fn new(
        source: &Path,
        params: &ExtractionParams,
        total_rows: usize,
        output: &OutputTable,
        export_path: Option<&Path>,
    ) -> Self {
        let roll_column = output.roll_column();
        let roll_of = |row: Option<&TaggedRow>| -> Option<String> {
            let cell = row?.cells.get(roll_column?)?;
            Some(cell.trim().to_string())
        };

        // Output rows are the runs' rows back to back, in run order.
        let mut offset = 0;
        let groups = output
            .runs
            .iter()
            .map(|run| {
                let rows = output.rows.get(offset..offset + run.len()).unwrap_or_default();
                offset += run.len();
                GroupSummary {
                    group_id: run.group_id,
                    start_row: run.start,
                    end_row: run.end,
                    len: run.len(),
                    first_roll: roll_of(rows.first()),
                    last_roll: roll_of(rows.last()),
                }
            })
            .collect();

        Self {
            timestamp: Utc::now().to_rfc3339(),
            source: source.display().to_string(),
            diff: params.diff(),
            recurrence: params.recurrence(),
            total_rows,
            emitted_rows: output.len(),
            group_count: output.group_count(),
            groups,
            export_path: export_path.map(|p| p.display().to_string()),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

// ============================================================================
// Console Summary
// ============================================================================

pub fn print_summary(report: &ProcessingReport) {
    println!("\n═══════════════════════════════════════════════════════════");
    println!("📊 PROCESSING SUMMARY");
    println!("═══════════════════════════════════════════════════════════");
    println!();
    println!("Source:           {}", report.source);
    println!("Max difference:   {}", report.diff);
    println!("Min group size:   {}", report.recurrence);
    println!("Groups found:     {}", report.group_count);

    for group in &report.groups {
        println!(
            "  Group {:>3}: rows {}-{} ({} rows, ROLL {} .. {})",
            group.group_id,
            group.start_row,
            group.end_row,
            group.len,
            group.first_roll.as_deref().unwrap_or("?"),
            group.last_roll.as_deref().unwrap_or("?"),
        );
    }

    let kept = if report.total_rows > 0 {
        (report.emitted_rows as f64 / report.total_rows as f64) * 100.0
    } else {
        0.0
    };
    println!();
    println!("Rows kept:        {:.1}% ({}/{})", kept, report.emitted_rows, report.total_rows);
    if let Some(path) = &report.export_path {
        println!("Exported to:      {}", path);
    }
    println!(
        "Total number of valid rows (people) in the output: {}",
        report.emitted_rows
    );
    println!("═══════════════════════════════════════════════════════════");
}

// ============================================================================
// Tests
// ============================================================================
