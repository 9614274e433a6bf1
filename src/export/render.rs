//! Console rendering with alternating group bands.

use crate::model::OutputTable;

/// Visual band a group is drawn in. Consecutive groups alternate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    LightBlue,
    LightGreen,
}

impl Band {
    /// RGB fill used for the band in the spreadsheet.
    pub fn rgb(self) -> u32 {
        match self {
            Band::LightBlue => 0xADD8E6,
            Band::LightGreen => 0x90EE90,
        }
    }

    /// One-character marker prefixed to text rows.
    pub fn marker(self) -> char {
        match self {
            Band::LightBlue => '░',
            Band::LightGreen => '▓',
        }
    }
}

pub fn band_for(group_id: usize) -> Band {
    if group_id % 2 == 0 {
        Band::LightBlue
    } else {
        Band::LightGreen
    }
}

/// Renders the output as an aligned text table.
///
/// The header row is followed by one line per emitted row, each prefixed
/// with its band marker. The last column is the group id.
pub fn render_table(output: &OutputTable) -> String {
    let body: Vec<Vec<String>> = output
        .rows
        .iter()
        .map(|row| {
            let mut cells: Vec<String> = row.cells.iter().map(|c| c.trim().to_string()).collect();
            cells.push(row.group_id.to_string());
            cells
        })
        .collect();

    let mut widths: Vec<usize> = output.columns.iter().map(|c| c.chars().count()).collect();
    for cells in &body {
        for (w, cell) in widths.iter_mut().zip(cells) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, ' ', &output.columns, &widths);
    for (row, cells) in output.rows.iter().zip(&body) {
        push_line(&mut out, band_for(row.group_id).marker(), cells, &widths);
    }
    out
}

fn push_line(out: &mut String, marker: char, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    line.push(marker);
    for (cell, width) in cells.iter().zip(widths) {
        line.push_str(&format!(" {:<width$}", cell, width = width));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}
