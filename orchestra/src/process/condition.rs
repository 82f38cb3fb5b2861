//! Conditions gating transitions

use crate::process::ExecutionContext;

/// Pure predicate over an execution context
///
/// Conditions are evaluated left to right and evaluation stops at the first
/// one that does not hold, so they must not have side effects.
pub trait Condition: Send + Sync {
    /// Whether the guarded transition may be taken for this context
    fn is_valid(&self, context: &ExecutionContext) -> bool;
}

impl<F> Condition for F
where
    F: Fn(&ExecutionContext) -> bool + Send + Sync,
{
    fn is_valid(&self, context: &ExecutionContext) -> bool {
        self(context)
    }
}

/// Condition that always holds
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysValid;

impl Condition for AlwaysValid {
    fn is_valid(&self, _context: &ExecutionContext) -> bool {
        true
    }
}

/// Condition that never holds
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysInvalid;

impl Condition for AlwaysInvalid {
    fn is_valid(&self, _context: &ExecutionContext) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::test_helpers::running_context;
    use serde_json::json;

    #[test]
    fn test_constant_conditions() {
        let context = running_context();
        assert!(AlwaysValid.is_valid(&context));
        assert!(!AlwaysInvalid.is_valid(&context));
    }

    #[test]
    fn test_closure_condition_reads_parameters() {
        let mut parameters = crate::process::Parameters::new();
        parameters.insert("approved".to_string(), json!(true));
        let context = crate::process::test_helpers::running_context_with(parameters);

        let approved = |context: &ExecutionContext| {
            context
                .parameters()
                .get("approved")
                .and_then(|v| v.as_bool())
                .unwrap_or(false)
        };

        assert!(approved.is_valid(&context));
        assert!(!approved.is_valid(&running_context()));
    }
}
