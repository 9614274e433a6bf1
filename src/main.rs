use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use rollseq_service::config::{ServiceConfig, process_env};
use rollseq_service::export::render::render_table;
use rollseq_service::logging::{self, LogLevel, Stage};
use rollseq_service::model::{ErrorKind, SequenceError};
use rollseq_service::pipeline::{self, RunOptions};
use rollseq_service::report::print_summary;

#[derive(Parser)]
#[command(name = "rollseq")]
#[command(about = "Extract runs of close ROLL values from a CSV table")]
#[command(version)]
struct Cli {
    #[arg(long, global = true, value_name = "FILE", help = "Config file (default: rollseq.toml if present)")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flags for the default `process` command when no subcommand is given.
    #[command(flatten)]
    process: ProcessArgs,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Extract groups and export them (the default)")]
    Process(ProcessArgs),
    #[command(about = "Print the effective configuration as TOML")]
    ShowConfig,
}

#[derive(Args)]
struct ProcessArgs {
    #[arg(long, value_name = "PATH", help = "CSV file to read")]
    data: Option<PathBuf>,
    #[arg(long, help = "Maximum difference between adjacent ROLL values")]
    diff: Option<f64>,
    #[arg(long, help = "Minimum number of rows in a group")]
    recurrence: Option<usize>,
    #[arg(long, short, value_name = "PATH", help = "Spreadsheet to write")]
    output: Option<PathBuf>,
    #[arg(long, help = "Do not write a spreadsheet")]
    no_export: bool,
    #[arg(long, help = "Print the processing report as JSON instead of a table")]
    json: bool,
    #[arg(long, short, help = "Only print the summary")]
    quiet: bool,
    #[arg(long, value_name = "PATH", help = "Append log entries to this file")]
    log_file: Option<String>,
    #[arg(long, value_name = "LEVEL", help = "debug, info, warn or error")]
    log_level: Option<String>,
}

impl ProcessArgs {
    fn apply(&self, config: &mut ServiceConfig) {
        if let Some(path) = &self.data {
            config.input.path = path.clone();
        }
        if let Some(diff) = self.diff {
            config.params.diff = diff;
        }
        if let Some(recurrence) = self.recurrence {
            config.params.recurrence = recurrence;
        }
        if let Some(path) = &self.output {
            config.output.path = path.clone();
        }
        if self.no_export {
            config.output.export = false;
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli.config.as_deref();
    let result = match &cli.command {
        Some(Commands::Process(args)) => process(config_path, args),
        Some(Commands::ShowConfig) => show_config(config_path),
        None => process(config_path, &cli.process),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code_for_error(&e)
        }
    }
}

/// Layers the config file, then the environment, then command line flags.
fn resolve_config<F>(
    config_path: Option<&Path>,
    args: Option<&ProcessArgs>,
    env: F,
) -> Result<ServiceConfig, SequenceError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ServiceConfig::load(config_path)?;
    config.apply_env_from(env)?;
    if let Some(args) = args {
        args.apply(&mut config);
    }
    Ok(config)
}

fn process(config_path: Option<&Path>, args: &ProcessArgs) -> Result<(), SequenceError> {
    let config = resolve_config(config_path, Some(args), process_env())?;

    // Keep stdout clean for JSON consumers.
    let level = if args.json {
        config.log_level()?.max(LogLevel::Warning)
    } else {
        config.log_level()?
    };
    logging::init_logger(
        level,
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );
    logging::debug(Stage::Config, None, &format!("{:?}", config));

    let options = RunOptions::from_config(&config)?;
    let outcome = pipeline::run(&options)?;

    if args.json {
        println!("{}", outcome.report.to_json()?);
        return Ok(());
    }

    if !args.quiet {
        println!("\nProcessed Data with Group Colors");
        print!("{}", render_table(&outcome.output));
    }
    print_summary(&outcome.report);
    Ok(())
}

fn show_config(config_path: Option<&Path>) -> Result<(), SequenceError> {
    let config = resolve_config(config_path, None, process_env())?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}

fn exit_status(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Schema => 2,
        ErrorKind::SourceUnavailable => 3,
        ErrorKind::Processing => 1,
    }
}

fn exit_code_for_error(err: &SequenceError) -> ExitCode {
    ExitCode::from(exit_status(err.kind()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::collections::HashMap;

    fn parse(argv: &[&str]) -> Cli {
        Cli::try_parse_from(argv).unwrap_or_else(|e| panic!("{:?} should parse: {}", argv, e))
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    // --- Argument shapes ----------------------------------------------------

    #[test]
    fn test_bare_flags_run_the_default_process_command() {
        let cli = parse(&["rollseq", "--data", "a.csv", "--diff", "3", "--no-export"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.process.data, Some(PathBuf::from("a.csv")));
        assert_eq!(cli.process.diff, Some(3.0));
        assert!(cli.process.no_export);
    }

    #[test]
    fn test_config_before_process_subcommand() {
        let cli = parse(&["rollseq", "--config", "x.toml", "process", "--diff", "3"]);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        match cli.command {
            Some(Commands::Process(args)) => assert_eq!(args.diff, Some(3.0)),
            _ => panic!("expected the process subcommand"),
        }
    }

    #[test]
    fn test_config_after_process_subcommand() {
        let cli = parse(&["rollseq", "process", "--config", "x.toml", "--recurrence", "5"]);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        match cli.command {
            Some(Commands::Process(args)) => assert_eq!(args.recurrence, Some(5)),
            _ => panic!("expected the process subcommand"),
        }
    }

    #[test]
    fn test_config_before_and_after_show_config() {
        for argv in [
            &["rollseq", "--config", "x.toml", "show-config"][..],
            &["rollseq", "show-config", "--config", "x.toml"][..],
        ] {
            let cli = parse(argv);
            assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
            assert!(matches!(cli.command, Some(Commands::ShowConfig)));
        }
    }

    #[test]
    fn test_no_arguments_uses_defaults() {
        let cli = parse(&["rollseq"]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
        assert!(cli.process.diff.is_none());
    }

    // --- Config precedence --------------------------------------------------

    #[test]
    fn test_flags_override_environment_which_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("rollseq.toml");
        std::fs::write(
            &config_path,
            "[params]\ndiff = 2\nrecurrence = 3\n[input]\npath = \"file.csv\"\n",
        )
        .unwrap();

        let env: HashMap<&str, &str> =
            [("ROLLSEQ_RECURRENCE", "6"), ("ROLLSEQ_DATA_PATH", "env.csv")].into_iter().collect();
        let lookup = |key: &str| env.get(key).map(|v| v.to_string());

        let cli = parse(&["rollseq", "--data", "flag.csv"]);
        let config = resolve_config(Some(&config_path), Some(&cli.process), lookup).unwrap();

        assert_eq!(config.params.diff, 2.0, "file value survives when nothing overrides it");
        assert_eq!(config.params.recurrence, 6, "environment overrides the file");
        assert_eq!(config.input.path, PathBuf::from("flag.csv"), "flags override the environment");
        assert_eq!(config.output.path, PathBuf::from("processed_data.xlsx"), "default kept");
    }

    #[test]
    fn test_config_resolution_without_process_flags() {
        let config = resolve_config(Some(Path::new("no/such/rollseq.toml")), None, no_env);
        assert!(config.is_err(), "a named config file must exist");

        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("rollseq.toml");
        std::fs::write(&config_path, "[output]\nexport = false\n").unwrap();
        let config = resolve_config(Some(&config_path), None, no_env).unwrap();
        assert!(!config.output.export);
    }

    // --- Exit codes ---------------------------------------------------------

    #[test]
    fn test_exit_status_per_error_kind() {
        let schema = SequenceError::MissingColumn("ROLL".to_string());
        let missing = SequenceError::SourceUnavailable(PathBuf::from("data/data.csv"));
        let ragged = SequenceError::RaggedRow { line: 2, expected: 2, found: 1 };

        assert_eq!(exit_status(schema.kind()), 2);
        assert_eq!(exit_status(missing.kind()), 3);
        assert_eq!(exit_status(ragged.kind()), 1);
    }
}
