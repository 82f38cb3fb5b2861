//! Process commands: launch, resume, status and list

use crate::cli::OutputFormat;
use crate::definitions;
use crate::error::{CliError, CliResult, IntoCliResult};
use crate::exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_WARNING};
use crate::runtime::{GlobalOptions, Runtime};
use colored::*;
use is_terminal::IsTerminal;
use orchestra::process::{
    ContextFinder, ContextReadModel, EngineError, Parameters, ProcessDefinition, ProcessId,
    ProcessStatus, ResumeOutcome,
};
use orchestra::{ErrorContext, OrchestraError};
use serde_json::Value;
use std::io;
use tabled::{
    settings::{object::Rows, Alignment, Color, Modify, Style},
    Table, Tabled,
};

#[derive(Tabled)]
struct ProcessRow {
    #[tabled(rename = "Process ID")]
    process_id: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Last State")]
    last_state: String,
    #[tabled(rename = "Transitions")]
    transitions: usize,
    #[tabled(rename = "Created")]
    created_at: String,
}

/// Launch a bundled definition with the given parameters
pub fn run_launch_command(
    options: &GlobalOptions,
    definition_name: &str,
    vars: &[String],
    params_json: Option<&str>,
    format: OutputFormat,
) -> CliResult<i32> {
    let parameters = match params_json {
        Some(json) => parse_params_json(json)?,
        None => parse_vars(vars)?,
    };
    let definition = build_definition(definition_name)?;
    let runtime = options.open_runtime()?;

    tracing::info!(definition = definition_name, "Launching process");
    let process_id = runtime
        .engine
        .launch(&definition, parameters)
        .map_err(OrchestraError::from)?;

    report(&runtime, &process_id, format)
}

/// Resume a paused process
pub fn run_resume_command(
    options: &GlobalOptions,
    definition_name: &str,
    process_id: &str,
    format: OutputFormat,
) -> CliResult<i32> {
    let definition = build_definition(definition_name)?;
    let runtime = options.open_runtime()?;
    let process_id = ProcessId::new(process_id);

    tracing::info!(definition = definition_name, %process_id, "Resuming process");
    match runtime.engine.resume(&definition, &process_id) {
        Ok(ResumeOutcome::Resumed(_)) => report(&runtime, &process_id, format),
        Ok(ResumeOutcome::UnknownState(state)) => {
            eprintln!(
                "{} Process {} stopped in state '{}' which {} does not define; nothing was resumed.",
                "Warning:".yellow(),
                process_id,
                state,
                definition_name
            );
            Ok(EXIT_WARNING)
        }
        Err(e) => Err(OrchestraError::from(e).into()),
    }
}

/// Show one stored process
pub fn run_status_command(
    options: &GlobalOptions,
    process_id: &str,
    format: OutputFormat,
) -> CliResult<i32> {
    let runtime = options.open_runtime()?;
    report(&runtime, &ProcessId::new(process_id), format)
}

/// List every stored process, oldest first
pub fn run_list_command(options: &GlobalOptions, format: OutputFormat) -> CliResult<i32> {
    let runtime = options.open_runtime()?;
    let rows = runtime.store.find_all().map_err(OrchestraError::from)?;

    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Yaml => print_yaml(&rows)?,
        OutputFormat::Table => display_table(&rows),
    }
    Ok(EXIT_SUCCESS)
}

fn build_definition(name: &str) -> orchestra::Result<ProcessDefinition> {
    let bundled = definitions::find_or_error(name)?;
    let registry = definitions::demo_registry()?;
    bundled
        .build(&registry)
        .with_context(|| format!("Failed to build process definition '{name}'"))
}

/// Parse `key=value` pairs; values stay strings
pub fn parse_vars(vars: &[String]) -> CliResult<Parameters> {
    let mut parameters = Parameters::new();
    for var in vars {
        match var.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                parameters.insert(key.to_string(), Value::String(value.to_string()));
            }
            _ => {
                return Err(CliError::new(
                    format!("Invalid variable format: '{}'. Use key=value format.", var),
                    EXIT_ERROR,
                ));
            }
        }
    }
    Ok(parameters)
}

/// Parse a JSON object into parameters
pub fn parse_params_json(json: &str) -> CliResult<Parameters> {
    let value: Value = serde_json::from_str(json).cli_validation_error()?;
    match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(CliError::new(
            format!("--params-json must be a JSON object, got: {}", other),
            EXIT_ERROR,
        )),
    }
}

/// Print the stored row and turn its status into an exit code
fn report(runtime: &Runtime, process_id: &ProcessId, format: OutputFormat) -> CliResult<i32> {
    let row = runtime
        .store
        .find_by_process_id(process_id)
        .map_err(OrchestraError::from)?
        .ok_or_else(|| OrchestraError::from(EngineError::NotFound(process_id.clone())))?;

    match format {
        OutputFormat::Json => print_json(&row)?,
        OutputFormat::Yaml => print_yaml(&row)?,
        OutputFormat::Table => print_process(&row),
    }

    Ok(match row.status {
        ProcessStatus::Failed => EXIT_WARNING,
        _ => EXIT_SUCCESS,
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value).cli_general_error()?;
    println!("{}", json);
    Ok(())
}

fn print_yaml<T: serde::Serialize>(value: &T) -> CliResult<()> {
    let yaml = serde_yaml::to_string(value).cli_general_error()?;
    print!("{}", yaml);
    Ok(())
}

fn status_label(status: ProcessStatus, is_tty: bool) -> String {
    if !is_tty {
        return status.to_string();
    }
    match status {
        ProcessStatus::Running => status.as_str().cyan().to_string(),
        ProcessStatus::Paused => status.as_str().yellow().to_string(),
        ProcessStatus::Finished => status.as_str().green().to_string(),
        ProcessStatus::Failed => status.as_str().red().to_string(),
    }
}

fn print_process(row: &ContextReadModel) {
    let is_tty = io::stdout().is_terminal();

    println!("Process ID: {}", row.process_id);
    println!("Status:     {}", status_label(row.status, is_tty));
    println!("Last state: {}", row.last_state_name);
    println!("Created:    {}", row.created_at.format("%Y-%m-%d %H:%M:%S UTC"));

    if !row.parameters.is_empty() {
        let mut keys: Vec<&String> = row.parameters.keys().collect();
        keys.sort();
        println!("Parameters:");
        for key in keys {
            println!("  {} = {}", key, row.parameters[key]);
        }
    }

    println!("History:    {} transitions", row.executed_transitions.len());
    for executed in &row.executed_transitions {
        println!(
            "  {}  {}",
            executed.executed_at.format("%Y-%m-%d %H:%M:%S"),
            executed.transition
        );
    }

    if let Some(failure) = &row.failure {
        println!("Failure:");
        for line in failure.lines() {
            println!("  {}", line);
        }
    }
}

fn display_table(rows: &[ContextReadModel]) {
    if rows.is_empty() {
        println!("No processes found.");
        return;
    }

    let is_tty = io::stdout().is_terminal();
    let table_rows: Vec<ProcessRow> = rows
        .iter()
        .map(|row| ProcessRow {
            process_id: row.process_id.to_string(),
            status: row.status.to_string(),
            last_state: row.last_state_name.clone(),
            transitions: row.executed_transitions.len(),
            created_at: row.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
        .collect();

    let mut table = Table::new(table_rows);
    table.with(Style::modern());

    if is_tty {
        table.with(Modify::new(Rows::one(0)).with(Color::FG_BRIGHT_CYAN));
        for (i, row) in rows.iter().enumerate() {
            let row_index = i + 1;
            let color = match row.status {
                ProcessStatus::Failed => Color::FG_RED,
                ProcessStatus::Paused => Color::FG_YELLOW,
                ProcessStatus::Finished => Color::FG_GREEN,
                ProcessStatus::Running => continue,
            };
            table.with(Modify::new(Rows::one(row_index)).with(color));
        }
    }

    table.with(Modify::new(Rows::new(1..)).with(Alignment::left()));
    println!("{}", table);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_vars() {
        let vars = vec!["order=42".to_string(), "note=a=b".to_string()];
        let parameters = parse_vars(&vars).unwrap();
        assert_eq!(parameters["order"], json!("42"));
        assert_eq!(parameters["note"], json!("a=b"));
    }

    #[test]
    fn test_parse_vars_rejects_missing_separator() {
        let error = parse_vars(&["order".to_string()]).unwrap_err();
        assert_eq!(error.exit_code, EXIT_ERROR);
        assert!(error.message.contains("key=value"));

        assert!(parse_vars(&["=42".to_string()]).is_err());
    }

    #[test]
    fn test_parse_params_json() {
        let parameters = parse_params_json(r#"{"order_id": 1234, "express": true}"#).unwrap();
        assert_eq!(parameters["order_id"], json!(1234));
        assert_eq!(parameters["express"], json!(true));
    }

    #[test]
    fn test_parse_params_json_requires_object() {
        let error = parse_params_json("[1, 2]").unwrap_err();
        assert_eq!(error.exit_code, EXIT_ERROR);

        let error = parse_params_json("{not json").unwrap_err();
        assert_eq!(error.exit_code, EXIT_ERROR);
    }

    #[test]
    fn test_unknown_definition() {
        let error = CliError::from(build_definition("example9").unwrap_err());
        assert_eq!(error.exit_code, EXIT_ERROR);
        assert_eq!(
            error.message,
            "Unknown process definition 'example9'. Available: example1, example2, example3"
        );
    }

    #[test]
    fn test_status_label_without_tty() {
        assert_eq!(status_label(ProcessStatus::Paused, false), "paused");
    }
}
