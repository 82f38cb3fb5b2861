//! Actions and post-actions run when a transition is taken
//!
//! An [`Action`] is attached to at most one transition and its failure fails
//! the whole process run. [`PostAction`]s are best effort: the engine logs
//! their failures and carries on.

use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Input parameters of a process run, immutable for the run's lifetime
pub type Parameters = HashMap<String, Value>;

/// Errors that can occur during action execution
#[derive(Debug, Error)]
pub enum ActionError {
    /// Generic action execution error
    #[error("Action execution failed: {0}")]
    ExecutionError(String),
    /// A parameter required by the action is missing or malformed
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Name of the offending parameter
        name: String,
        /// Why the parameter was rejected
        reason: String,
    },
    /// IO error during action execution
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Any other error raised by an action implementation
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for action operations
pub type ActionResult<T> = Result<T, ActionError>;

/// Side-effecting unit invoked when a transition is taken
pub trait Action: Send + Sync {
    /// Run the action with the process parameters
    fn run(&self, parameters: &Parameters) -> ActionResult<()>;

    /// Identity used in logs
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Best-effort unit invoked after a transition's action succeeded
pub trait PostAction: Send + Sync {
    /// Run the post-action with the process parameters
    fn run(&self, parameters: &Parameters) -> ActionResult<()>;

    /// Identity used in logs
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Action that logs a message
#[derive(Debug, Clone)]
pub struct LogAction {
    /// Message to log
    pub message: String,
    /// Log level
    pub level: LogLevel,
}

/// Log levels for LogAction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Informational log level
    Info,
    /// Warning log level
    Warning,
    /// Error log level
    Error,
}

impl LogAction {
    /// Create a new log action
    pub fn new(message: impl Into<String>, level: LogLevel) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }

    /// Create an info log action
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, LogLevel::Info)
    }

    /// Create a warning log action
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, LogLevel::Warning)
    }

    /// Create an error log action
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, LogLevel::Error)
    }

    fn log(&self, parameters: &Parameters) {
        let parameter_count = parameters.len();
        match self.level {
            LogLevel::Info => tracing::info!(parameter_count, "{}", self.message),
            LogLevel::Warning => tracing::warn!(parameter_count, "{}", self.message),
            LogLevel::Error => tracing::error!(parameter_count, "{}", self.message),
        }
    }
}

impl Action for LogAction {
    fn run(&self, parameters: &Parameters) -> ActionResult<()> {
        self.log(parameters);
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

impl PostAction for LogAction {
    fn run(&self, parameters: &Parameters) -> ActionResult<()> {
        self.log(parameters);
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
