/// Structured logging for the ROLL extraction service
///
/// Every entry carries a pipeline stage and an optional subject (a file
/// path, a group id). Supports console output and an append-only log file
/// for unattended runs.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;
use std::sync::Mutex;

use crate::model::{ErrorKind, SequenceError};

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline Stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Extract,
    Export,
    Config,
    System,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Load => write!(f, "LOAD"),
            Stage::Extract => write!(f, "EXTRACT"),
            Stage::Export => write!(f, "EXPORT"),
            Stage::Config => write!(f, "CFG"),
            Stage::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    fn log(&self, level: LogLevel, stage: Stage, subject: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let entry = format_entry(level, stage, subject, message);
        let subject_part = subject.map(|s| format!(" [{}]", s)).unwrap_or_default();

        if self.console_timestamps {
            match level {
                LogLevel::Error | LogLevel::Warning => eprintln!("{}", entry),
                LogLevel::Info | LogLevel::Debug => println!("{}", entry),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", stage, subject_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", stage, subject_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}", message),
            }
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

/// Full timestamped form of an entry, as written to the log file.
fn format_entry(level: LogLevel, stage: Stage, subject: Option<&str>, message: &str) -> String {
    let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    let subject_part = subject.map(|s| format!(" [{}]", s)).unwrap_or_default();
    format!("{} {} {}{}: {}", timestamp, level, stage, subject_part, message)
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn dispatch(level: LogLevel, stage: Stage, subject: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, stage, subject, message);
        }
    }
}

pub fn info(stage: Stage, subject: Option<&str>, message: &str) {
    dispatch(LogLevel::Info, stage, subject, message);
}

pub fn warn(stage: Stage, subject: Option<&str>, message: &str) {
    dispatch(LogLevel::Warning, stage, subject, message);
}

pub fn error(stage: Stage, subject: Option<&str>, message: &str) {
    dispatch(LogLevel::Error, stage, subject, message);
}

pub fn debug(stage: Stage, subject: Option<&str>, message: &str) {
    dispatch(LogLevel::Debug, stage, subject, message);
}

// ---------------------------------------------------------------------------
// Failure Logging
// ---------------------------------------------------------------------------

/// Level a failure is reported at.
///
/// Schema and missing-source problems are the user's input to fix, so they
/// are warnings; anything else means processing broke and is an error.
pub fn failure_level(err: &SequenceError) -> LogLevel {
    match err.kind() {
        ErrorKind::Schema | ErrorKind::SourceUnavailable => LogLevel::Warning,
        ErrorKind::Processing => LogLevel::Error,
    }
}

/// Log a failed pipeline step with its classification.
pub fn log_failure(stage: Stage, subject: Option<&str>, err: &SequenceError) {
    let message = format!("failed [{:?}]: {}", err.kind(), err);
    dispatch(failure_level(err), stage, subject, &message);
}

// ---------------------------------------------------------------------------
// Run Summary Logging
// ---------------------------------------------------------------------------

/// Log the outcome of one extraction run.
pub fn log_run_summary(total_rows: usize, emitted_rows: usize, groups: usize) {
    let message = format!(
        "Extraction complete: {} group(s), {}/{} rows kept",
        groups, emitted_rows, total_rows
    );

    if groups == 0 && total_rows > 0 {
        warn(Stage::Extract, None, &message);
    } else {
        info(Stage::Extract, None, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("WARN".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!(" debug ".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_failure_classification() {
        let schema = SequenceError::MissingColumn("ROLL".to_string());
        assert_eq!(failure_level(&schema), LogLevel::Warning);

        let missing = SequenceError::SourceUnavailable(PathBuf::from("data/data.csv"));
        assert_eq!(failure_level(&missing), LogLevel::Warning);

        let ragged = SequenceError::RaggedRow { line: 3, expected: 2, found: 1 };
        assert_eq!(failure_level(&ragged), LogLevel::Error);
    }

    #[test]
    fn test_entry_format_includes_stage_and_subject() {
        let entry = format_entry(LogLevel::Info, Stage::Load, Some("data.csv"), "read 12 rows");
        assert!(entry.ends_with("INFO LOAD [data.csv]: read 12 rows"), "got {}", entry);
    }

    #[test]
    fn test_log_file_receives_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rollseq.log");
        let logger = Logger {
            min_level: LogLevel::Warning,
            log_file: Some(path.to_string_lossy().into_owned()),
            console_timestamps: true,
        };

        logger.log(LogLevel::Info, Stage::Load, None, "filtered out");
        logger.log(LogLevel::Error, Stage::Export, Some("out.xlsx"), "disk full");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("filtered out"));
        assert!(contents.contains("ERROR EXPORT [out.xlsx]: disk full"));
    }
}
