//! Name-keyed registry of actions
//!
//! Process definitions are assembled from actions looked up by name here.
//! The engine itself never resolves actions by name: it only calls the
//! [`Action`] handles wired into transitions at build time.

use crate::process::{Action, DefinitionError, DefinitionResult};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by the action registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// An action is already registered under this name
    #[error("Action with name \"{0}\" is already registered")]
    AlreadyRegistered(String),
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry for managing named actions
#[derive(Default, Clone)]
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    /// Create a new empty action registry
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    /// Register an action under a name, refusing duplicates
    pub fn register(&mut self, name: impl Into<String>, action: Arc<dyn Action>) -> RegistryResult<()> {
        let name = name.into();
        if self.actions.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        tracing::debug!(action = %name, "Registered action");
        self.actions.insert(name, action);
        Ok(())
    }

    /// Get an action by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Action>> {
        self.actions.get(name).cloned()
    }

    /// Action a definition refers to, failing the build when it is missing
    pub fn resolve(&self, name: &str) -> DefinitionResult<Arc<dyn Action>> {
        self.get(name).ok_or_else(|| DefinitionError::UnknownAction {
            name: name.to_string(),
        })
    }

    /// Check whether an action is registered under this name
    pub fn has(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// All registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.actions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the number of registered actions
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::LogAction;

    #[test]
    fn test_register_and_get() {
        let mut registry = ActionRegistry::new();
        registry
            .register("action1", Arc::new(LogAction::info("Running action 1...")))
            .unwrap();

        assert!(registry.has("action1"));
        assert!(!registry.has("action2"));
        assert!(registry.get("action1").is_some());
        assert!(registry.get("action2").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_duplicate_fails() {
        let mut registry = ActionRegistry::new();
        registry
            .register("action1", Arc::new(LogAction::info("first")))
            .unwrap();

        let result = registry.register("action1", Arc::new(LogAction::info("second")));
        assert_eq!(
            result,
            Err(RegistryError::AlreadyRegistered("action1".to_string()))
        );
        assert_eq!(
            result.unwrap_err().to_string(),
            "Action with name \"action1\" is already registered"
        );
    }

    #[test]
    fn test_resolve_missing_action_fails() {
        let mut registry = ActionRegistry::new();
        registry
            .register("action1", Arc::new(LogAction::info("first")))
            .unwrap();

        assert!(registry.resolve("action1").is_ok());
        let error = registry.resolve("action2").err().unwrap();
        assert!(matches!(
            &error,
            DefinitionError::UnknownAction { name } if name == "action2"
        ));
        assert_eq!(error.to_string(), "Action \"action2\" is not registered");
    }

    #[test]
    fn test_names_are_sorted() {
        let mut registry = ActionRegistry::new();
        assert!(registry.is_empty());
        for name in ["zeta", "alpha", "mid"] {
            registry.register(name, Arc::new(LogAction::info(name))).unwrap();
        }
        assert_eq!(registry.names(), vec!["alpha", "mid", "zeta"]);
    }
}
