use colored::*;
use orchestra::process::{ActionRegistry, DefinitionError, ProcessGraphAnalyzer};
use orchestra::OrchestraError;

use crate::definitions::{self, BundledDefinition};
use crate::error::CliResult;
use crate::exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_WARNING};

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub level: ValidationLevel,
    pub definition: String,
    pub message: String,
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub issues: Vec<ValidationIssue>,
    pub definitions_checked: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl ValidationResult {
    pub fn add_issue(&mut self, issue: ValidationIssue) {
        match issue.level {
            ValidationLevel::Error => self.errors += 1,
            ValidationLevel::Warning => self.warnings += 1,
        }
        self.issues.push(issue);
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings > 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.has_errors() {
            EXIT_ERROR
        } else if self.has_warnings() {
            EXIT_WARNING
        } else {
            EXIT_SUCCESS
        }
    }
}

/// Check one bundled definition
pub fn validate_definition(
    bundled: &BundledDefinition,
    registry: &ActionRegistry,
    result: &mut ValidationResult,
) {
    result.definitions_checked += 1;

    let definition = match bundled.build(registry) {
        Ok(definition) => definition,
        Err(error) => {
            let suggestion = match &error {
                DefinitionError::CycleDetected { .. } => {
                    Some("Remove one transition of the cycle".to_string())
                }
                DefinitionError::ActionAlreadyDefined { .. } => {
                    Some("Split the work into two transitions or one composite action".to_string())
                }
                DefinitionError::UnknownAction { name } => {
                    Some(format!("Register an action named '{}' before building", name))
                }
                DefinitionError::InvalidState(_) => None,
            };
            result.add_issue(ValidationIssue {
                level: ValidationLevel::Error,
                definition: bundled.name.to_string(),
                message: error.to_string(),
                suggestion,
            });
            return;
        }
    };

    let analyzer = ProcessGraphAnalyzer::new(&definition);
    for state in analyzer.find_unreachable_states() {
        result.add_issue(ValidationIssue {
            level: ValidationLevel::Warning,
            definition: bundled.name.to_string(),
            message: format!(
                "State '{}' is not reachable from the start state",
                definition.state(state).name()
            ),
            suggestion: Some("Connect it with a transition or remove it".to_string()),
        });
    }
}

/// Validate every bundled definition, or only `name`
pub fn run_validate_command(name: Option<&str>) -> CliResult<i32> {
    let registry = definitions::demo_registry().map_err(OrchestraError::from)?;

    let selected: Vec<&BundledDefinition> = match name {
        Some(name) => vec![definitions::find_or_error(name)?],
        None => definitions::BUNDLED.iter().collect(),
    };

    let mut result = ValidationResult::default();
    for bundled in selected {
        validate_definition(bundled, &registry, &mut result);
    }

    print_results(&result);
    Ok(result.exit_code())
}

fn print_results(result: &ValidationResult) {
    for issue in &result.issues {
        let level = match issue.level {
            ValidationLevel::Error => "ERROR".red(),
            ValidationLevel::Warning => "WARN".yellow(),
        };
        println!("{} [{}] {}", level, issue.definition.bold(), issue.message);
        if let Some(suggestion) = &issue.suggestion {
            println!("  💡 {}", suggestion);
        }
    }

    println!();
    println!(
        "Checked {} definition{}",
        result.definitions_checked,
        if result.definitions_checked == 1 { "" } else { "s" }
    );
    if result.has_errors() {
        println!("  Errors: {}", result.errors.to_string().red());
    }
    if result.has_warnings() {
        println!("  Warnings: {}", result.warnings.to_string().yellow());
    }

    if result.has_errors() {
        println!("\n{} Validation failed with errors.", "✗".red());
    } else if result.has_warnings() {
        println!("\n{} Validation completed with warnings.", "⚠".yellow());
    } else {
        println!("\n{} All definitions are valid!", "✓".green());
    }
}
