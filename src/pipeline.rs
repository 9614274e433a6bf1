//! One end-to-end extraction run: source check, load, extract, export.
//!
//! This is the outer boundary of the service. Every failure is logged here
//! with its stage and then returned unchanged; nothing partial is returned
//! on error.

use std::path::{Path, PathBuf};

use crate::analysis::sequences::extract;
use crate::config::ServiceConfig;
use crate::export::xlsx::write_workbook;
use crate::ingest::csv_table::load_table;
use crate::logging::{self, Stage};
use crate::model::{OutputTable, SequenceError};
use crate::params::ExtractionParams;
use crate::report::ProcessingReport;

/// What to read, how to scan it, and where (if anywhere) to export.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub data_path: PathBuf,
    pub params: ExtractionParams,
    pub export_path: Option<PathBuf>,
}

impl RunOptions {
    pub fn from_config(config: &ServiceConfig) -> Result<Self, SequenceError> {
        Ok(Self {
            data_path: config.input.path.clone(),
            params: config.extraction_params()?,
            export_path: config.output.export.then(|| config.output.path.clone()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub output: OutputTable,
    pub report: ProcessingReport,
}

pub fn run(options: &RunOptions) -> Result<RunOutcome, SequenceError> {
    let source = options.data_path.display().to_string();

    if !options.data_path.exists() {
        return logged(
            Stage::Load,
            &source,
            Err(SequenceError::SourceUnavailable(options.data_path.clone())),
        );
    }

    let table = logged(Stage::Load, &source, load_table(&options.data_path))?;
    logging::info(
        Stage::Load,
        Some(&source),
        &format!("Read {} rows, columns: {}", table.len(), table.columns.join(", ")),
    );

    let params = options.params;
    logging::debug(
        Stage::Extract,
        None,
        &format!("diff={} recurrence={}", params.diff(), params.recurrence()),
    );
    let output = logged(
        Stage::Extract,
        &source,
        extract(&table, params.diff(), params.recurrence()),
    )?;
    logging::log_run_summary(table.len(), output.len(), output.group_count());

    let export_path = match &options.export_path {
        Some(path) => {
            export(&output, path)?;
            Some(path.as_path())
        }
        None => None,
    };

    let report = ProcessingReport::new(
        &options.data_path,
        &params,
        table.len(),
        &output,
        export_path,
    );

    Ok(RunOutcome { output, report })
}

fn logged<T>(
    stage: Stage,
    subject: &str,
    result: Result<T, SequenceError>,
) -> Result<T, SequenceError> {
    result.inspect_err(|e| logging::log_failure(stage, Some(subject), e))
}

fn export(output: &OutputTable, path: &Path) -> Result<(), SequenceError> {
    let subject = path.display().to_string();
    logged(Stage::Export, &subject, write_workbook(output, path))?;
    logging::info(
        Stage::Export,
        Some(&subject),
        &format!("Wrote {} rows to spreadsheet", output.len()),
    );
    Ok(())
}
