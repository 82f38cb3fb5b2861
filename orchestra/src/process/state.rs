//! State-related types for process definitions

use crate::process::TransitionRef;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the synthetic state every process definition starts from
pub const START_STATE_NAME: &str = "startState";

/// Errors that can occur when creating state-related types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// State name cannot be empty or whitespace only
    #[error("State name cannot be empty or whitespace only")]
    EmptyStateName,
}

/// Result type for state operations
pub type StateResult<T> = Result<T, StateError>;

/// Human readable name of a state
///
/// Names are not unique inside a definition: two states may share a name and
/// still be distinct states. Use [`StateRef`] when identity matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StateName(String);

impl StateName {
    /// Create a new state name
    ///
    /// # Panics
    /// Panics if the name is empty or whitespace only. For non-panicking creation,
    /// use `try_new` instead.
    pub fn new(name: impl Into<String>) -> Self {
        Self::try_new(name).expect("State name cannot be empty or whitespace only")
    }

    /// Create a new state name, returning an error for invalid input
    pub fn try_new(name: impl Into<String>) -> StateResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(StateError::EmptyStateName);
        }
        Ok(Self(name))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StateName {
    type Error = StateError;

    fn try_from(value: String) -> StateResult<Self> {
        Self::try_new(value)
    }
}

impl From<StateName> for String {
    fn from(name: StateName) -> Self {
        name.0
    }
}

impl std::borrow::Borrow<str> for StateName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StateName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identity of a state inside one process definition
///
/// This is an index into the definition's state arena, so it is only
/// meaningful together with the definition that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateRef(pub(crate) usize);

impl StateRef {
    /// Position of the state in its definition's arena
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A state in a process graph
#[derive(Debug, Clone)]
pub struct State {
    pub(crate) key: StateRef,
    pub(crate) name: StateName,
    pub(crate) next_transitions: Vec<TransitionRef>,
}

impl State {
    pub(crate) fn new(key: StateRef, name: StateName) -> Self {
        Self {
            key,
            name,
            next_transitions: Vec::new(),
        }
    }

    /// Identity of this state
    pub fn key(&self) -> StateRef {
        self.key
    }

    /// Name of this state
    pub fn name(&self) -> &StateName {
        &self.name
    }

    /// Outgoing transitions in declaration order, which is also selection priority
    pub fn next_transitions(&self) -> &[TransitionRef] {
        &self.next_transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_name_creation() {
        let name = StateName::new("state1");
        assert_eq!(name.as_str(), "state1");
        assert_eq!(name.to_string(), "state1");
    }

    #[test]
    fn test_state_name_try_new_empty_error() {
        assert_eq!(StateName::try_new(""), Err(StateError::EmptyStateName));
        assert_eq!(StateName::try_new("   "), Err(StateError::EmptyStateName));
        assert_eq!(StateName::try_new("\t\n"), Err(StateError::EmptyStateName));
    }

    #[test]
    #[should_panic(expected = "State name cannot be empty or whitespace only")]
    fn test_state_name_new_panics_on_empty() {
        StateName::new("");
    }

    #[test]
    fn test_state_name_deserialization_rejects_blank() {
        let ok: StateName = serde_json::from_str("\"state2\"").unwrap();
        assert_eq!(ok.as_str(), "state2");
        assert!(serde_json::from_str::<StateName>("\" \"").is_err());
    }

    #[test]
    fn test_new_state_has_no_transitions() {
        let state = State::new(StateRef(3), StateName::new("s"));
        assert_eq!(state.key().index(), 3);
        assert!(state.next_transitions().is_empty());
    }
}
