//! Process definitions bundled with the command line
//!
//! Definitions are built on demand so that `validate` can report a
//! definition that fails to build instead of refusing to start.

use orchestra::process::{
    ActionRegistry, AlwaysInvalid, AlwaysValid, Condition, DefinitionError, DefinitionResult,
    LogAction, ProcessBuilder, ProcessDefinition, RegistryResult,
};
use orchestra::OrchestraError;
use std::sync::Arc;

/// Name under which the demo logging action is registered
pub const DEMO_ACTION: &str = "action1";

/// Populates a builder, resolving actions by name
pub type InitFn = fn(&mut ProcessBuilder, &ActionRegistry) -> DefinitionResult<()>;

/// A definition the CLI knows how to build
#[derive(Clone, Copy)]
pub struct BundledDefinition {
    pub name: &'static str,
    pub description: &'static str,
    init: InitFn,
}

impl std::fmt::Debug for BundledDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundledDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl BundledDefinition {
    pub const fn new(name: &'static str, description: &'static str, init: InitFn) -> Self {
        Self {
            name,
            description,
            init,
        }
    }

    /// Build the definition, resolving actions from `registry`
    pub fn build(&self, registry: &ActionRegistry) -> DefinitionResult<ProcessDefinition> {
        let init = self.init;
        ProcessDefinition::build(self.name, |p| init(p, registry))
    }
}

/// Every bundled definition, in display order
pub const BUNDLED: &[BundledDefinition] = &[
    BundledDefinition::new(
        "example1",
        "Linear run through state1, state2 and state3",
        example1,
    ),
    BundledDefinition::new(
        "example2",
        "Branches on conditions, skipping the always-invalid route",
        example2,
    ),
    BundledDefinition::new(
        "example3",
        "Pauses after reaching state2, resumes into state5",
        example3,
    ),
];

/// Look a bundled definition up by name
pub fn find(name: &str) -> Option<&'static BundledDefinition> {
    BUNDLED.iter().find(|definition| definition.name == name)
}

/// Like [`find`], naming the known definitions when `name` is not one of them
pub fn find_or_error(name: &str) -> orchestra::Result<&'static BundledDefinition> {
    find(name).ok_or_else(|| OrchestraError::DefinitionNotFound {
        name: name.to_string(),
        available: BUNDLED.iter().map(|d| d.name.to_string()).collect(),
    })
}

/// Registry holding the actions bundled definitions refer to
pub fn demo_registry() -> RegistryResult<ActionRegistry> {
    let mut registry = ActionRegistry::new();
    registry.register(DEMO_ACTION, Arc::new(LogAction::info("Running action 1...")))?;
    Ok(registry)
}

fn example1(p: &mut ProcessBuilder, registry: &ActionRegistry) -> DefinitionResult<()> {
    let state1 = p.state("state1")?;
    let state2 = p.state("state2")?;
    let state3 = p.state("state3")?;

    let action = registry.resolve(DEMO_ACTION)?;
    let start = p.start_state();
    p.then(start, state1).with_action(action)?;
    p.then(state1, state2);
    p.then(state2, state3);
    Ok(())
}

fn example2(p: &mut ProcessBuilder, _registry: &ActionRegistry) -> DefinitionResult<()> {
    branching(p, false)
}

fn example3(p: &mut ProcessBuilder, _registry: &ActionRegistry) -> DefinitionResult<()> {
    branching(p, true)
}

fn branching(p: &mut ProcessBuilder, pause_in_state2: bool) -> DefinitionResult<()> {
    let state1 = p.state("state1")?;
    let state2 = p.state("state2")?;
    let state3 = p.state("state3")?;
    let state4 = p.state("state4")?;
    let state5 = p.state("state5")?;

    let always_valid: Arc<dyn Condition> = Arc::new(AlwaysValid);
    let always_invalid: Arc<dyn Condition> = Arc::new(AlwaysInvalid);

    let start = p.start_state();
    p.then(start, state1);
    let to_state2 = p.when(state1, vec![always_valid]).then(state2);
    if pause_in_state2 {
        to_state2.with_pause_after_transition();
    }
    p.then(state1, state3);
    p.when(state2, vec![always_invalid]).then(state4);
    p.then(state2, state5);
    Ok(())
}

/// Build every bundled definition, keeping failures next to their name
pub fn build_all(
    registry: &ActionRegistry,
) -> Vec<(&'static BundledDefinition, Result<ProcessDefinition, DefinitionError>)> {
    BUNDLED
        .iter()
        .map(|definition| (definition, definition.build(registry)))
        .collect()
}
