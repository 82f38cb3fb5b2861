use clap::CommandFactory;
use orchestra_cli::cli::{Cli, Commands};
use orchestra_cli::error::handle_cli_result;
use orchestra_cli::exit_codes::EXIT_SUCCESS;
use orchestra_cli::runtime::GlobalOptions;
use orchestra_cli::{list, logging, process, validate};
use std::process::exit;

fn main() {
    let cli = Cli::parse_args();

    let Some(command) = cli.command else {
        // Printing help can only fail on a closed stdout
        let _ = Cli::command().print_help();
        exit(EXIT_SUCCESS);
    };

    logging::init(cli.quiet, cli.debug, cli.verbose);

    let options = GlobalOptions {
        config: cli.config,
        storage_dir: cli.storage_dir,
    };

    let result = match command {
        Commands::Launch {
            definition,
            vars,
            params_json,
            format,
        } => process::run_launch_command(
            &options,
            &definition,
            &vars,
            params_json.as_deref(),
            format,
        ),
        Commands::Resume {
            definition,
            process_id,
            format,
        } => process::run_resume_command(&options, &definition, &process_id, format),
        Commands::Status { process_id, format } => {
            process::run_status_command(&options, &process_id, format)
        }
        Commands::List { format } => process::run_list_command(&options, format),
        Commands::Definitions { format } => list::run_definitions_command(format),
        Commands::Validate { definition } => validate::run_validate_command(definition.as_deref()),
    };

    exit(handle_cli_result(result));
}
