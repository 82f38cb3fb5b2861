//! Process execution engine

pub mod core;
pub mod post_actions;

use crate::process::{ProcessId, ProcessStatus, StateName, StorageError};
use thiserror::Error;

pub use self::core::{Engine, ResumeOutcome};
pub use post_actions::{LoggingPostActionsExecutor, PostActionsExecutor};

/// Errors that can occur during process execution
///
/// Action failures are not among them: they end up on the context and the
/// call still succeeds.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A run reached a state it had already visited
    #[error("Circular transition detected: state '{state}' was already visited in this run")]
    CircularTransition {
        /// Name of the state reached twice
        state: StateName,
    },
    /// The finder returned a transition without a destination
    #[error("Transition from '{from}' has no destination state")]
    DeadEndSelected {
        /// Name of the transition's source state
        from: StateName,
    },
    /// No persisted context exists for the process id
    #[error("Process execution context not found: {0}")]
    NotFound(ProcessId),
    /// Only paused processes can be resumed
    #[error("Process '{process_id}' cannot be resumed from status '{status}'")]
    ResumeForbidden {
        /// Process that was asked to resume
        process_id: ProcessId,
        /// Its persisted status
        status: ProcessStatus,
    },
    /// The context could not be read or written
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
