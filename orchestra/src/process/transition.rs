//! Transition-related types for process definitions

use crate::process::{Action, Condition, PostAction, StateRef};
use std::sync::Arc;

/// Stable identity of a transition inside one process definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionRef(pub(crate) usize);

impl TransitionRef {
    /// Position of the transition in its definition's arena
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Represents a transition between states
///
/// A transition is owned by its from-state's outgoing list. It is only
/// selectable once it has a destination and all of its conditions hold.
pub struct Transition {
    pub(crate) key: TransitionRef,
    pub(crate) from_state: StateRef,
    pub(crate) to_state: Option<StateRef>,
    pub(crate) conditions: Vec<Arc<dyn Condition>>,
    pub(crate) action: Option<Arc<dyn Action>>,
    pub(crate) post_actions: Vec<Arc<dyn PostAction>>,
    pub(crate) pause_after_transition: bool,
}

impl Transition {
    pub(crate) fn new(
        key: TransitionRef,
        from_state: StateRef,
        conditions: Vec<Arc<dyn Condition>>,
    ) -> Self {
        Self {
            key,
            from_state,
            to_state: None,
            conditions,
            action: None,
            post_actions: Vec::new(),
            pause_after_transition: false,
        }
    }

    /// Identity of this transition
    pub fn key(&self) -> TransitionRef {
        self.key
    }

    /// Source state
    pub fn from_state(&self) -> StateRef {
        self.from_state
    }

    /// Destination state, `None` for a dead end
    pub fn to_state(&self) -> Option<StateRef> {
        self.to_state
    }

    /// Conditions that must all hold
    pub fn conditions(&self) -> &[Arc<dyn Condition>] {
        &self.conditions
    }

    /// Action run when the transition is taken
    pub fn action(&self) -> Option<&Arc<dyn Action>> {
        self.action.as_ref()
    }

    /// Post-actions run after the action, in order
    pub fn post_actions(&self) -> &[Arc<dyn PostAction>] {
        &self.post_actions
    }

    /// Whether taking this transition pauses the process
    pub fn is_paused(&self) -> bool {
        self.pause_after_transition
    }
}

impl std::fmt::Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("key", &self.key)
            .field("from_state", &self.from_state)
            .field("to_state", &self.to_state)
            .field("conditions", &self.conditions.len())
            .field("action", &self.action.as_ref().map(|a| a.name().to_string()))
            .field(
                "post_actions",
                &self
                    .post_actions
                    .iter()
                    .map(|p| p.name().to_string())
                    .collect::<Vec<_>>(),
            )
            .field("pause_after_transition", &self.pause_after_transition)
            .finish()
    }
}
