//! Best-effort execution of post-actions

use crate::process::{Parameters, PostAction};
use std::sync::Arc;

/// Runs a transition's post-actions without letting their failures escape
pub trait PostActionsExecutor: Send + Sync {
    /// Run every post-action in order
    fn execute(&self, post_actions: &[Arc<dyn PostAction>], parameters: &Parameters);
}

/// Logs each failing post-action once and moves on to the next
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingPostActionsExecutor;

impl PostActionsExecutor for LoggingPostActionsExecutor {
    fn execute(&self, post_actions: &[Arc<dyn PostAction>], parameters: &Parameters) {
        for post_action in post_actions {
            if let Err(error) = post_action.run(parameters) {
                tracing::error!(
                    post_action = post_action.name(),
                    error = %error,
                    parameters = ?parameters,
                    "Post-action failed"
                );
            }
        }
    }
}
