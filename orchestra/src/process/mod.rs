//! Process orchestration: state graphs, execution contexts and the engine
//!
//! A [`ProcessDefinition`] is an immutable, acyclic graph of named states
//! built once through [`ProcessDefinition::build`]. The [`Engine`] drives one
//! [`ExecutionContext`] through it per run, and persists the outcome through a
//! [`ContextWriter`].

mod actions;
mod condition;
mod context;
mod definition;
pub mod engine;
mod finder;
mod graph;
mod registry;
mod state;
mod storage;
#[cfg(test)]
mod test_helpers;
mod transition;
mod transition_key;

pub use actions::{
    Action, ActionError, ActionResult, LogAction, LogLevel, Parameters, PostAction,
};
pub use condition::{AlwaysInvalid, AlwaysValid, Condition};
pub use context::{
    ContextBuilder, ContextFactory, ContextReadModel, ExecutedTransition, ExecutionContext,
    ProcessId, ProcessIdGenerator, ProcessStatus, StoredTransition, UlidGenerator, UuidGenerator,
};
pub use definition::{
    DefinitionError, DefinitionResult, ProcessBuilder, ProcessDefinition, TransitionBuilder,
};
pub use engine::{
    Engine, EngineError, EngineResult, LoggingPostActionsExecutor, PostActionsExecutor,
    ResumeOutcome,
};
pub use finder::{FirstEligibleTransitionFinder, NextTransitionFinder};
pub use graph::ProcessGraphAnalyzer;
pub use registry::{ActionRegistry, RegistryError, RegistryResult};
pub use state::{State, StateError, StateName, StateRef, StateResult, START_STATE_NAME};
pub use storage::{
    merge_row, CompositeContextWriter, ContextFinder, ContextWriter, FileSystemContextStore,
    LogContextWriter, MemoryContextStore, StorageError, StorageResult,
};
pub use transition::{Transition, TransitionRef};
pub use transition_key::{TransitionKey, LEGACY_SEPARATOR};
