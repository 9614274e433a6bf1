//! Service configuration.
//!
//! Settings are layered, later layers winning:
//!   1. built-in defaults
//!   2. a TOML file (`rollseq.toml` unless another path is given)
//!   3. environment variables, after loading `.env` via `dotenv`
//!   4. command line flags (applied by the binary)
//!
//! Example `rollseq.toml`:
//!
//! ```toml
//! [input]
//! path = "data/data.csv"
//!
//! [params]
//! diff = 4
//! recurrence = 9
//!
//! [output]
//! path = "processed_data.xlsx"
//! export = true
//!
//! [logging]
//! level = "info"
//! file = "rollseq.log"
//! timestamps = false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::export::XLSX_FILE_NAME;
use crate::logging::LogLevel;
use crate::model::SequenceError;
use crate::params::{DEFAULT_DIFF, DEFAULT_RECURRENCE, ExtractionParams};

/// Config file read when none is named explicitly.
pub const DEFAULT_CONFIG_PATH: &str = "rollseq.toml";

/// Data file read when none is configured.
pub const DEFAULT_DATA_PATH: &str = "data/data.csv";

// ---------------------------------------------------------------------------
// Config sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub input: InputConfig,
    pub params: ParamsConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParamsConfig {
    pub diff: f64,
    pub recurrence: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub path: PathBuf,
    /// Write the spreadsheet at all; `false` only prints the result.
    pub export: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATA_PATH),
        }
    }
}

impl Default for ParamsConfig {
    fn default() -> Self {
        Self {
            diff: DEFAULT_DIFF,
            recurrence: DEFAULT_RECURRENCE,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(XLSX_FILE_NAME),
            export: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl ServiceConfig {
    /// Parse a TOML document. Missing sections and keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, SequenceError> {
        toml::from_str(text).map_err(|e| SequenceError::Config(e.to_string()))
    }

    /// Load the config file.
    ///
    /// With `Some(path)` the file must exist. With `None` the default path
    /// is tried and built-in defaults are used when it is absent.
    pub fn load(path: Option<&Path>) -> Result<Self, SequenceError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        if !path.exists() {
            if required {
                return Err(SequenceError::Config(format!(
                    "config file '{}' not found",
                    path.display()
                )));
            }
            return Ok(Self::default());
        }

        let text = fs::read_to_string(&path)?;
        Self::from_toml_str(&text)
    }

    /// Apply `ROLLSEQ_*` overrides from an arbitrary lookup.
    ///
    /// Takes the lookup as a parameter so tests can supply variables
    /// without touching the process environment.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), SequenceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ROLLSEQ_DATA_PATH") {
            self.input.path = PathBuf::from(v);
        }
        if let Some(v) = lookup("ROLLSEQ_OUTPUT_PATH") {
            self.output.path = PathBuf::from(v);
        }
        if let Some(v) = lookup("ROLLSEQ_DIFF") {
            self.params.diff = parse_env("ROLLSEQ_DIFF", &v)?;
        }
        if let Some(v) = lookup("ROLLSEQ_RECURRENCE") {
            self.params.recurrence = parse_env("ROLLSEQ_RECURRENCE", &v)?;
        }
        if let Some(v) = lookup("ROLLSEQ_LOG_FILE") {
            self.logging.file = Some(v);
        }
        if let Some(v) = lookup("ROLLSEQ_LOG_LEVEL") {
            self.logging.level = v;
        }
        Ok(())
    }

    /// Validated extraction parameters.
    pub fn extraction_params(&self) -> Result<ExtractionParams, SequenceError> {
        ExtractionParams::new(self.params.diff, self.params.recurrence)
    }

    /// The effective configuration as a TOML document.
    pub fn to_toml_string(&self) -> Result<String, SequenceError> {
        toml::to_string_pretty(self).map_err(|e| SequenceError::Config(e.to_string()))
    }

    pub fn log_level(&self) -> Result<LogLevel, SequenceError> {
        self.logging.level.parse().map_err(SequenceError::Config)
    }
}

/// Loads `.env` if present and returns a lookup over the process
/// environment, for `ServiceConfig::apply_env_from`.
pub fn process_env() -> impl Fn(&str) -> Option<String> {
    dotenv::dotenv().ok();
    |key: &str| std::env::var(key).ok()
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, SequenceError> {
    value
        .trim()
        .parse()
        .map_err(|_| SequenceError::Config(format!("{} has invalid value '{}'", key, value)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = ServiceConfig::from_toml_str("").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.input.path, PathBuf::from("data/data.csv"));
        assert_eq!(config.output.path, PathBuf::from("processed_data.xlsx"));
        assert_eq!(config.params.diff, 4.0);
        assert_eq!(config.params.recurrence, 9);
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let config = ServiceConfig::from_toml_str("[params]\nrecurrence = 3\n").unwrap();
        assert_eq!(config.params.recurrence, 3);
        assert_eq!(config.params.diff, 4.0);
        assert!(config.output.export);
    }

    #[test]
    fn test_unknown_keys_are_config_errors() {
        let err = ServiceConfig::from_toml_str("[params]\ndiference = 3\n")
            .expect_err("typo should not be silently ignored");
        assert!(matches!(err, SequenceError::Config(_)));
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut config =
            ServiceConfig::from_toml_str("[params]\ndiff = 2\n[input]\npath = \"a.csv\"\n")
                .unwrap();
        let env: HashMap<&str, &str> = [
            ("ROLLSEQ_DIFF", "6"),
            ("ROLLSEQ_DATA_PATH", "b.csv"),
            ("ROLLSEQ_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();

        config
            .apply_env_from(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.params.diff, 6.0);
        assert_eq!(config.params.recurrence, 9);
        assert_eq!(config.input.path, PathBuf::from("b.csv"));
        assert_eq!(config.log_level().unwrap(), LogLevel::Debug);
    }

    #[test]
    fn test_unparseable_environment_value_is_rejected() {
        let mut config = ServiceConfig::default();
        let err = config
            .apply_env_from(|key| (key == "ROLLSEQ_RECURRENCE").then(|| "many".to_string()))
            .expect_err("non-numeric recurrence");
        assert!(err.to_string().contains("ROLLSEQ_RECURRENCE"));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let err = ServiceConfig::load(Some(Path::new("no/such/rollseq.toml")))
            .expect_err("named config must exist");
        assert!(matches!(err, SequenceError::Config(_)));
    }

    #[test]
    fn test_load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rollseq.toml");
        std::fs::write(&path, "[output]\nexport = false\n").unwrap();

        let config = ServiceConfig::load(Some(&path)).unwrap();
        assert!(!config.output.export);
    }

    #[test]
    fn test_effective_config_renders_back_to_toml() {
        let mut config = ServiceConfig::default();
        config.params.recurrence = 5;
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("recurrence = 5"), "got:\n{}", text);
        assert_eq!(ServiceConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_params_surface_at_validation() {
        let config = ServiceConfig::from_toml_str("[params]\nrecurrence = 0\n").unwrap();
        assert!(config.extraction_params().is_err());
    }
}
