//! Process execution context
//!
//! One [`ExecutionContext`] tracks one run of a process: status, last state,
//! the transitions taken during this run and the failure that stopped it.
//! Contexts are created by a [`ContextFactory`] on launch, or rebuilt by a
//! [`ContextBuilder`] from a persisted [`ContextReadModel`] on resume.

use crate::process::{ActionError, Parameters, State, StateName, StateRef, TransitionKey, TransitionRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use ulid::Ulid;
use uuid::Uuid;

/// Unique identifier of a process run
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(String);

impl ProcessId {
    /// Wrap an existing identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProcessId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProcessId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Source of fresh process ids
pub trait ProcessIdGenerator: Send + Sync {
    /// Generate a new, unique id
    fn generate(&self) -> ProcessId;
}

/// Generates lexicographically sortable ULIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct UlidGenerator;

impl ProcessIdGenerator for UlidGenerator {
    fn generate(&self) -> ProcessId {
        ProcessId(Ulid::new().to_string())
    }
}

/// Generates random UUID v4 ids
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl ProcessIdGenerator for UuidGenerator {
    fn generate(&self) -> ProcessId {
        ProcessId(Uuid::new_v4().to_string())
    }
}

/// Status of a process run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    /// Transitions are being taken
    Running,
    /// Stopped after a pause-after transition, may be resumed
    Paused,
    /// An action failed
    Failed,
    /// No further transition was eligible
    Finished,
}

impl ProcessStatus {
    /// Short storage form
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessStatus::Running => "running",
            ProcessStatus::Paused => "paused",
            ProcessStatus::Failed => "failed",
            ProcessStatus::Finished => "finished",
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(ProcessStatus::Running),
            "paused" => Ok(ProcessStatus::Paused),
            "failed" => Ok(ProcessStatus::Failed),
            "finished" => Ok(ProcessStatus::Finished),
            other => Err(format!("Unknown process status '{other}'")),
        }
    }
}

/// Record of one transition taken during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredTransition", into = "StoredTransition")]
pub struct ExecutedTransition {
    /// Names of the states the transition connected
    pub transition: TransitionKey,
    /// When the transition was taken
    pub executed_at: DateTime<Utc>,
}

impl ExecutedTransition {
    /// Record a transition taken now
    pub fn now(from: StateName, to: StateName) -> Self {
        Self {
            transition: TransitionKey::new(from, to),
            executed_at: Utc::now(),
        }
    }

    /// Source state name
    pub fn from_state(&self) -> &StateName {
        &self.transition.from
    }

    /// Destination state name
    pub fn to_state(&self) -> &StateName {
        &self.transition.to
    }
}

/// Persisted shape of an executed transition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTransition {
    executed_at: DateTime<Utc>,
    transition: StoredTransitionKey,
}

/// Rows written before names were stored as a pair hold `"from::to"`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredTransitionKey {
    Pair(TransitionKey),
    Legacy(String),
}

impl From<ExecutedTransition> for StoredTransition {
    fn from(executed: ExecutedTransition) -> Self {
        Self {
            executed_at: executed.executed_at,
            transition: StoredTransitionKey::Pair(executed.transition),
        }
    }
}

impl TryFrom<StoredTransition> for ExecutedTransition {
    type Error = String;

    fn try_from(stored: StoredTransition) -> Result<Self, Self::Error> {
        let transition = match stored.transition {
            StoredTransitionKey::Pair(key) => key,
            StoredTransitionKey::Legacy(value) => TransitionKey::parse_legacy(&value)?,
        };
        Ok(Self {
            transition,
            executed_at: stored.executed_at,
        })
    }
}

/// Mutable run state of one process instance
///
/// Only the engine mutates a context; everything else reads it.
#[derive(Debug)]
pub struct ExecutionContext {
    process_id: ProcessId,
    status: ProcessStatus,
    last_state: Option<StateRef>,
    last_state_name: Option<StateName>,
    executed_transitions: Vec<ExecutedTransition>,
    current_transition: Option<TransitionRef>,
    parameters: Arc<Parameters>,
    created_at: DateTime<Utc>,
    failure: Option<ActionError>,
}

impl ExecutionContext {
    fn new(
        process_id: ProcessId,
        status: ProcessStatus,
        created_at: DateTime<Utc>,
        parameters: Parameters,
    ) -> Self {
        Self {
            process_id,
            status,
            last_state: None,
            last_state_name: None,
            executed_transitions: Vec::new(),
            current_transition: None,
            parameters: Arc::new(parameters),
            created_at,
            failure: None,
        }
    }

    /// Identity of the run
    pub fn process_id(&self) -> &ProcessId {
        &self.process_id
    }

    /// Current status
    pub fn status(&self) -> ProcessStatus {
        self.status
    }

    /// Last state reached
    pub fn last_state(&self) -> Option<StateRef> {
        self.last_state
    }

    /// Name of the last state reached
    pub fn last_state_name(&self) -> Option<&StateName> {
        self.last_state_name.as_ref()
    }

    /// Transitions taken during this run only, oldest first
    pub fn executed_transitions(&self) -> &[ExecutedTransition] {
        &self.executed_transitions
    }

    /// Transition being or last processed
    pub fn current_transition(&self) -> Option<TransitionRef> {
        self.current_transition
    }

    /// Input parameters, unchanged for the context's lifetime
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// When the process was first launched
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Error that failed the run, if any
    pub fn failure(&self) -> Option<&ActionError> {
        self.failure.as_ref()
    }

    /// Failure rendered with its source chain, as persisted
    pub fn failure_report(&self) -> Option<String> {
        self.failure.as_ref().map(|error| {
            let mut report = error.to_string();
            let mut source = std::error::Error::source(error);
            while let Some(cause) = source {
                report.push_str("\nCaused by: ");
                report.push_str(&cause.to_string());
                source = cause.source();
            }
            report
        })
    }

    pub(crate) fn set_last_state(&mut self, state: &State) {
        self.last_state = Some(state.key());
        self.last_state_name = Some(state.name().clone());
    }

    pub(crate) fn set_status(&mut self, status: ProcessStatus) {
        self.status = status;
    }

    pub(crate) fn set_current_transition(&mut self, transition: TransitionRef) {
        self.current_transition = Some(transition);
    }

    pub(crate) fn set_failure(&mut self, failure: ActionError) {
        self.failure = Some(failure);
    }

    pub(crate) fn add_executed_transition(&mut self, executed: ExecutedTransition) {
        self.executed_transitions.push(executed);
    }
}

/// Creates fresh contexts on launch
#[derive(Clone)]
pub struct ContextFactory {
    id_generator: Arc<dyn ProcessIdGenerator>,
}

impl ContextFactory {
    /// Factory using the given id generator
    pub fn new(id_generator: Arc<dyn ProcessIdGenerator>) -> Self {
        Self { id_generator }
    }

    /// New running context positioned on `last_state`
    pub fn create(&self, last_state: &State, parameters: Parameters) -> ExecutionContext {
        let mut context = ExecutionContext::new(
            self.id_generator.generate(),
            ProcessStatus::Running,
            Utc::now(),
            parameters,
        );
        context.set_last_state(last_state);
        context
    }
}

impl Default for ContextFactory {
    fn default() -> Self {
        Self::new(Arc::new(UlidGenerator))
    }
}

impl fmt::Debug for ContextFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextFactory").finish_non_exhaustive()
    }
}

/// Persisted view of a process run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextReadModel {
    /// Identity of the run
    pub process_id: ProcessId,
    /// Status at the last save
    pub status: ProcessStatus,
    /// Name of the last state reached
    pub last_state_name: String,
    /// Full history across all launch and resume calls
    pub executed_transitions: Vec<ExecutedTransition>,
    /// When the process was first launched
    pub created_at: DateTime<Utc>,
    /// Input parameters
    #[serde(default)]
    pub parameters: Parameters,
    /// Rendered failure, if the run failed
    #[serde(default)]
    pub failure: Option<String>,
}

/// Rebuilds a context from its read model on resume
#[derive(Debug)]
pub struct ContextBuilder {
    context: ExecutionContext,
}

impl ContextBuilder {
    /// Start from the persisted identity, status, creation time and parameters
    pub fn from_read_model(read_model: &ContextReadModel) -> Self {
        Self {
            context: ExecutionContext::new(
                read_model.process_id.clone(),
                read_model.status,
                read_model.created_at,
                read_model.parameters.clone(),
            ),
        }
    }

    /// Position the context on the state being resumed from
    pub fn with_last_state(mut self, state: &State) -> Self {
        self.context.set_last_state(state);
        self
    }

    /// Override the status
    pub fn with_status(mut self, status: ProcessStatus) -> Self {
        self.context.set_status(status);
        self
    }

    /// Finish building
    pub fn build(self) -> ExecutionContext {
        self.context
    }
}
