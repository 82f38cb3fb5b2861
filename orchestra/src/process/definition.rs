//! Process definition construction and lookup
//!
//! A [`ProcessDefinition`] is assembled once through an init hook that wires
//! states and transitions on a [`ProcessBuilder`]. Construction then walks the
//! graph from the start state to index every reachable state by name and
//! rejects any definition whose reachable name graph contains a cycle.

use crate::process::{
    Action, AlwaysValid, Condition, PostAction, ProcessGraphAnalyzer, State, StateError,
    StateName, StateRef, Transition, TransitionRef, START_STATE_NAME,
};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while building a process definition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// The reachable state graph contains a cycle
    #[error("Cycle detected in process definition: {}", format_cycle(.path))]
    CycleDetected {
        /// Cycle path, closed by repeating its first state
        path: Vec<StateName>,
    },
    /// A second action was attached to one transition
    #[error("Transition from '{from}' already has an action defined")]
    ActionAlreadyDefined {
        /// Name of the transition's source state
        from: StateName,
    },
    /// A state was created with an empty name
    #[error(transparent)]
    InvalidState(#[from] StateError),
    /// A transition refers to an action missing from the registry
    #[error("Action \"{name}\" is not registered")]
    UnknownAction {
        /// Name the action was looked up by
        name: String,
    },
}

impl DefinitionError {
    /// Cycle path as state name strings, when this is a cycle error
    pub fn cycle_path(&self) -> Option<Vec<&str>> {
        match self {
            DefinitionError::CycleDetected { path } => {
                Some(path.iter().map(StateName::as_str).collect())
            }
            _ => None,
        }
    }
}

/// Result type for definition operations
pub type DefinitionResult<T> = Result<T, DefinitionError>;

fn format_cycle(path: &[StateName]) -> String {
    path.iter()
        .map(StateName::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Arena collecting states and transitions during a definition's init hook
#[derive(Debug)]
pub struct ProcessBuilder {
    states: Vec<State>,
    transitions: Vec<Transition>,
}

impl ProcessBuilder {
    fn new() -> Self {
        Self {
            states: vec![State::new(StateRef(0), StateName::new(START_STATE_NAME))],
            transitions: Vec::new(),
        }
    }

    /// The synthetic start state every definition owns
    pub fn start_state(&self) -> StateRef {
        StateRef(0)
    }

    /// Create a new state; two calls with the same name yield distinct states
    pub fn state(&mut self, name: impl Into<String>) -> DefinitionResult<StateRef> {
        let name = StateName::try_new(name)?;
        let key = StateRef(self.states.len());
        self.states.push(State::new(key, name));
        Ok(key)
    }

    /// Name of a state created by this builder
    pub fn state_name(&self, state: StateRef) -> &StateName {
        self.states[state.0].name()
    }

    /// Append an unconditioned transition `from -> to`
    pub fn then(&mut self, from: StateRef, to: StateRef) -> TransitionBuilder<'_> {
        let always: Arc<dyn Condition> = Arc::new(AlwaysValid);
        self.when(from, vec![always]).then(to)
    }

    /// Append a transition out of `from` guarded by `conditions`, without a destination yet
    pub fn when(
        &mut self,
        from: StateRef,
        conditions: Vec<Arc<dyn Condition>>,
    ) -> TransitionBuilder<'_> {
        let key = TransitionRef(self.transitions.len());
        self.transitions.push(Transition::new(key, from, conditions));
        self.states[from.0].next_transitions.push(key);
        TransitionBuilder {
            builder: self,
            transition: key,
        }
    }
}

/// Handle on the transition just appended to a [`ProcessBuilder`]
pub struct TransitionBuilder<'a> {
    builder: &'a mut ProcessBuilder,
    transition: TransitionRef,
}

impl<'a> TransitionBuilder<'a> {
    fn transition_mut(&mut self) -> &mut Transition {
        &mut self.builder.transitions[self.transition.0]
    }

    /// Identity of the transition being configured
    pub fn key(&self) -> TransitionRef {
        self.transition
    }

    /// Set the destination state
    pub fn then(mut self, to: StateRef) -> Self {
        self.transition_mut().to_state = Some(to);
        self
    }

    /// Attach the transition's action; fails if one is already attached
    pub fn with_action(mut self, action: Arc<dyn Action>) -> DefinitionResult<Self> {
        let from = self.transition_mut().from_state;
        if self.transition_mut().action.is_some() {
            return Err(DefinitionError::ActionAlreadyDefined {
                from: self.builder.state_name(from).clone(),
            });
        }
        self.transition_mut().action = Some(action);
        Ok(self)
    }

    /// Append one post-action
    pub fn with_post_action(mut self, post_action: Arc<dyn PostAction>) -> Self {
        self.transition_mut().post_actions.push(post_action);
        self
    }

    /// Append several post-actions, keeping their order
    pub fn with_post_actions(
        mut self,
        post_actions: impl IntoIterator<Item = Arc<dyn PostAction>>,
    ) -> Self {
        self.transition_mut().post_actions.extend(post_actions);
        self
    }

    /// Pause the process once this transition has been taken
    pub fn with_pause_after_transition(mut self) -> Self {
        self.transition_mut().pause_after_transition = true;
        self
    }
}

/// An immutable, validated graph of states and transitions
#[derive(Debug)]
pub struct ProcessDefinition {
    name: String,
    states: Vec<State>,
    transitions: Vec<Transition>,
    by_name: HashMap<StateName, StateRef>,
    registered: Vec<StateRef>,
}

impl ProcessDefinition {
    /// Build and validate a definition through its init hook
    pub fn build<F>(name: impl Into<String>, init: F) -> DefinitionResult<Self>
    where
        F: FnOnce(&mut ProcessBuilder) -> DefinitionResult<()>,
    {
        let name = name.into();
        let mut builder = ProcessBuilder::new();
        init(&mut builder)?;

        let mut definition = Self {
            name,
            states: builder.states,
            transitions: builder.transitions,
            by_name: HashMap::new(),
            registered: Vec::new(),
        };
        definition.register_states();

        if let Some(path) = ProcessGraphAnalyzer::new(&definition).find_cycle() {
            tracing::debug!(process = %definition.name, cycle = %format_cycle(&path), "Rejected process definition");
            return Err(DefinitionError::CycleDetected { path });
        }

        tracing::debug!(
            process = %definition.name,
            states = definition.registered.len(),
            transitions = definition.transitions.len(),
            "Built process definition"
        );
        Ok(definition)
    }

    /// Index the start state and every reachable state by name, first seen wins
    fn register_states(&mut self) {
        let start = StateRef(0);
        self.by_name
            .insert(self.states[start.0].name().clone(), start);
        self.registered.push(start);

        let mut stack: Vec<TransitionRef> =
            self.states[start.0].next_transitions.iter().rev().copied().collect();
        while let Some(transition) = stack.pop() {
            let Some(to) = self.transitions[transition.0].to_state else {
                continue;
            };
            let name = self.states[to.0].name();
            if self.by_name.contains_key(name) {
                continue;
            }
            self.by_name.insert(name.clone(), to);
            self.registered.push(to);
            stack.extend(self.states[to.0].next_transitions.iter().rev().copied());
        }
    }

    /// Definition name used in logs and storage
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The synthetic start state
    pub fn start_state(&self) -> StateRef {
        StateRef(0)
    }

    /// Look up a registered state by name
    pub fn state_by_name(&self, name: &str) -> Option<StateRef> {
        self.by_name.get(name).copied()
    }

    /// Access a state by identity
    pub fn state(&self, state: StateRef) -> &State {
        &self.states[state.0]
    }

    /// Outgoing transitions of a state, in declaration order
    pub fn next_transitions(&self, state: StateRef) -> impl Iterator<Item = &Transition> + '_ {
        self.states[state.0]
            .next_transitions
            .iter()
            .map(move |t| &self.transitions[t.0])
    }

    /// Registered states in registration order, start state first
    pub fn registered_states(&self) -> impl Iterator<Item = &State> + '_ {
        self.registered.iter().map(move |s| &self.states[s.0])
    }

    /// Every state created by the init hook, reachable or not
    pub fn all_states(&self) -> &[State] {
        &self.states
    }
}
