/// Input adapters that turn external files into a `model::Table`.
///
/// Submodules:
/// - `csv_table` — comma-separated files with a header row.

pub mod csv_table;
