//! Name-level key of a transition
//!
//! Executed transitions are recorded and persisted by state names, not by
//! arena identity, so that history stays readable after a definition changes.

use super::StateName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator of the legacy compact form `from::to`
pub const LEGACY_SEPARATOR: &str = "::";

/// A type-safe key representing a transition between two named states
///
/// Persists as `{"fromState": ..., "toState": ...}`, so state names may
/// contain any characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionKey {
    /// The source state of the transition
    #[serde(rename = "fromState")]
    pub from: StateName,
    /// The destination state of the transition
    #[serde(rename = "toState")]
    pub to: StateName,
}

impl TransitionKey {
    /// Creates a new transition key
    pub fn new(from: StateName, to: StateName) -> Self {
        Self { from, to }
    }

    /// Parse the legacy compact form `from::to`, splitting at the first separator
    pub fn parse_legacy(value: &str) -> Result<Self, String> {
        let (from, to) = value
            .split_once(LEGACY_SEPARATOR)
            .ok_or_else(|| format!("Invalid transition '{value}': expected 'from::to'"))?;
        let from = StateName::try_new(from).map_err(|e| format!("Invalid transition '{value}': {e}"))?;
        let to = StateName::try_new(to).map_err(|e| format!("Invalid transition '{value}': {e}"))?;
        Ok(Self { from, to })
    }
}

impl fmt::Display for TransitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
