//! CLI commands and argument parsing

use crate::engine::LookupKind;
use crate::settings::DEFAULT_INTEGRATION;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// LMS extract-and-load CLI
#[derive(Parser, Debug)]
#[command(name = "lms-etl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (JSON or YAML); falls back to $LMS_ETL_SETTINGS
    #[arg(short, long, global = true)]
    pub settings: Option<PathBuf>,

    /// Integration entry inside the settings file
    #[arg(short, long, global = true, default_value = DEFAULT_INTEGRATION)]
    pub integration: String,

    /// Column type description file (overrides the settings' schema_file)
    #[arg(long, global = true)]
    pub schema: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch and load data for one or more processes
    Run {
        /// Batch file of process descriptors (JSON or YAML)
        #[arg(short, long, conflicts_with = "process")]
        batch: Option<PathBuf>,

        /// Process to run (repeatable, empty = all)
        #[arg(short, long)]
        process: Vec<String>,

        /// Write CSV files into this directory instead of database tables
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Append to existing tables instead of replacing their rows
        #[arg(long)]
        append: bool,
    },

    /// Fetch a single item by id
    Get {
        /// Resource to fetch
        #[arg(short, long, value_enum)]
        kind: LookupKind,

        /// Item id
        #[arg(long)]
        id: String,
    },

    /// List process names and their default targets
    Processes,

    /// Load and validate settings
    Validate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_processes() {
        let cli = Cli::parse_from([
            "lms-etl",
            "--settings",
            "settings.json",
            "run",
            "--process",
            "get_users",
            "-p",
            "groups",
            "--append",
        ]);

        assert_eq!(cli.integration, "TALENT");
        assert_eq!(cli.settings, Some(PathBuf::from("settings.json")));
        match cli.command {
            Commands::Run {
                batch,
                process,
                csv,
                append,
            } => {
                assert!(batch.is_none());
                assert_eq!(process, vec!["get_users", "groups"]);
                assert!(csv.is_none());
                assert!(append);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_get() {
        let cli = Cli::parse_from(["lms-etl", "get", "--kind", "course", "--id", "7", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Get { kind: LookupKind::Course, ref id } if id == "7"
        ));
    }

    #[test]
    fn test_batch_conflicts_with_process() {
        let result = Cli::try_parse_from([
            "lms-etl", "run", "--batch", "b.json", "--process", "get_users",
        ]);
        assert!(result.is_err());
    }
}
