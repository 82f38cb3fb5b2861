//! Unified error handling for the Orchestra library
//!
//! Each concern keeps its own typed error ([`DefinitionError`],
//! [`EngineError`], ...). [`OrchestraError`] wraps them for callers that
//! drive several concerns at once, such as the command line.

use crate::config::ConfigError;
use crate::process::{DefinitionError, EngineError, RegistryError, StorageError};
use thiserror::Error;

/// The main error type for the Orchestra library
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OrchestraError {
    /// A process definition could not be built
    #[error("Invalid process definition: {0}")]
    Definition(#[from] DefinitionError),

    /// Launching or resuming a process failed
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Action registration failed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Context storage failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Process definition not known by name
    #[error("Unknown process definition '{name}'. Available: {}", .available.join(", "))]
    DefinitionNotFound {
        /// Name that was asked for
        name: String,
        /// Names that would have matched
        available: Vec<String>,
    },

    /// Generic error with context
    #[error("{message}")]
    Context {
        /// What was being attempted
        message: String,
        /// Underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type alias for Orchestra operations
pub type Result<T> = std::result::Result<T, OrchestraError>;

/// Extension trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn context<S: Into<String>>(self, msg: S) -> Result<T>;

    /// Add context with a closure that's only called on error
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context<S: Into<String>>(self, msg: S) -> Result<T> {
        self.map_err(|e| OrchestraError::Context {
            message: msg.into(),
            source: Box::new(e),
        })
    }

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| OrchestraError::Context {
            message: f().into(),
            source: Box::new(e),
        })
    }
}
