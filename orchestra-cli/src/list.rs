use is_terminal::IsTerminal;
use std::io;
use tabled::{
    settings::{object::Rows, Alignment, Color, Modify, Style},
    Table, Tabled,
};

use crate::cli::OutputFormat;
use crate::definitions::{self, BundledDefinition};
use crate::error::{CliResult, IntoCliResult};
use crate::exit_codes::EXIT_SUCCESS;
use orchestra::process::{ProcessDefinition, ProcessGraphAnalyzer};
use orchestra::OrchestraError;

#[derive(Tabled)]
struct DefinitionRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "States")]
    states: usize,
    #[tabled(rename = "Pauses")]
    pauses: usize,
}

#[derive(Debug, serde::Serialize)]
struct DefinitionInfo {
    name: String,
    description: String,
    states: Vec<String>,
    transitions: Vec<TransitionInfo>,
}

#[derive(Debug, serde::Serialize)]
struct TransitionInfo {
    from: String,
    to: Option<String>,
    conditions: usize,
    action: Option<String>,
    post_actions: usize,
    pause_after_transition: bool,
}

fn describe(bundled: &BundledDefinition, definition: &ProcessDefinition) -> DefinitionInfo {
    let analyzer = ProcessGraphAnalyzer::new(definition);
    let reachable = analyzer.find_reachable_states(definition.start_state());

    let states = definition
        .all_states()
        .iter()
        .filter(|state| reachable.contains(&state.key()))
        .map(|state| state.name().to_string())
        .collect();

    let transitions = definition
        .all_states()
        .iter()
        .filter(|state| reachable.contains(&state.key()))
        .flat_map(|state| definition.next_transitions(state.key()))
        .map(|transition| TransitionInfo {
            from: definition.state(transition.from_state()).name().to_string(),
            to: transition
                .to_state()
                .map(|to| definition.state(to).name().to_string()),
            conditions: transition.conditions().len(),
            action: transition.action().map(|action| action.name().to_string()),
            post_actions: transition.post_actions().len(),
            pause_after_transition: transition.is_paused(),
        })
        .collect();

    DefinitionInfo {
        name: bundled.name.to_string(),
        description: bundled.description.to_string(),
        states,
        transitions,
    }
}

/// List the bundled process definitions
pub fn run_definitions_command(format: OutputFormat) -> CliResult<i32> {
    let registry = definitions::demo_registry().map_err(OrchestraError::from)?;
    let mut infos = Vec::new();
    for bundled in definitions::BUNDLED {
        let definition = bundled.build(&registry).map_err(OrchestraError::from)?;
        infos.push(describe(bundled, &definition));
    }

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&infos).cli_general_error()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&infos).cli_general_error()?;
            print!("{}", yaml);
        }
        OutputFormat::Table => display_table(&infos),
    }

    Ok(EXIT_SUCCESS)
}

fn display_table(infos: &[DefinitionInfo]) {
    let rows: Vec<DefinitionRow> = infos
        .iter()
        .map(|info| DefinitionRow {
            name: info.name.clone(),
            description: info.description.clone(),
            states: info.states.len(),
            pauses: info
                .transitions
                .iter()
                .filter(|t| t.pause_after_transition)
                .count(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::modern());
    if io::stdout().is_terminal() {
        table.with(Modify::new(Rows::one(0)).with(Color::FG_BRIGHT_CYAN));
    }
    table.with(Modify::new(Rows::new(1..)).with(Alignment::left()));

    println!("{}", table);
}
