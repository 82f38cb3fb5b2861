use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

#[derive(Parser, Debug)]
#[command(name = "orchestra")]
#[command(version)]
#[command(about = "Launch, resume and inspect Orchestra processes")]
#[command(long_about = "
orchestra drives processes through the bundled process definitions and
stores each run's execution context on disk.

Example usage:
  orchestra definitions                      # Show the bundled definitions
  orchestra launch example3 --var order=42   # Start a process
  orchestra resume example3 <PROCESS_ID>     # Continue a paused process
  orchestra status <PROCESS_ID>              # Inspect a stored process
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file to load instead of searching for one
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding stored process contexts
    #[arg(long, global = true, value_name = "DIR")]
    pub storage_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch a new process
    #[command(long_about = "
Creates a new execution context for the named definition and runs it from
the start state until it finishes, pauses or fails. The process id is
printed on stdout.

Parameters are given either as repeated --var key=value pairs, or as a
single JSON object with --params-json.

Examples:
  orchestra launch example1
  orchestra launch example2 --var customer=acme --var priority=high
  orchestra launch example3 --params-json '{\"order_id\": 1234}'
")]
    Launch {
        /// Name of the process definition
        definition: String,

        /// Parameter as key=value (repeatable)
        #[arg(long = "var", value_name = "KEY=VALUE", conflicts_with = "params_json")]
        vars: Vec<String>,

        /// Parameters as a JSON object
        #[arg(long, value_name = "JSON")]
        params_json: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Resume a paused process
    Resume {
        /// Name of the process definition the process was launched with
        definition: String,

        /// Id printed by `orchestra launch`
        process_id: String,

        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Show the stored context of a process
    Status {
        /// Id printed by `orchestra launch`
        process_id: String,

        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// List stored processes
    List {
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// List the bundled process definitions
    Definitions {
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Check the bundled process definitions
    #[command(long_about = "
Builds every bundled process definition (or just the named one), checks
that it is acyclic and reports states no transition leads to.

Exit codes:
  0 - all definitions are valid
  1 - warnings found (unreachable states)
  2 - a definition failed to build
")]
    Validate {
        /// Only check this definition
        definition: Option<String>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn try_parse_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_with_vars() {
        let cli = Cli::try_parse_from_args([
            "orchestra", "launch", "example1", "--var", "a=1", "--var", "b=two",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Launch {
                definition,
                vars,
                params_json,
                format,
            }) => {
                assert_eq!(definition, "example1");
                assert_eq!(vars, vec!["a=1", "b=two"]);
                assert!(params_json.is_none());
                assert_eq!(format, OutputFormat::Table);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_vars_conflict_with_json() {
        let result = Cli::try_parse_from_args([
            "orchestra",
            "launch",
            "example1",
            "--var",
            "a=1",
            "--params-json",
            "{}",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_resume_requires_process_id() {
        assert!(Cli::try_parse_from_args(["orchestra", "resume", "example3"]).is_err());

        let cli = Cli::try_parse_from_args(["orchestra", "resume", "example3", "01J0ABC"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Resume { ref process_id, .. }) if process_id == "01J0ABC"
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from_args([
            "orchestra",
            "list",
            "--storage-dir",
            "/tmp/runs",
            "--quiet",
            "--format",
            "json",
        ])
        .unwrap();

        assert!(cli.quiet);
        assert_eq!(cli.storage_dir, Some(PathBuf::from("/tmp/runs")));
        assert!(matches!(
            cli.command,
            Some(Commands::List {
                format: OutputFormat::Json
            })
        ));
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from_args(["orchestra"]).unwrap();
        assert!(cli.command.is_none());
    }
}
