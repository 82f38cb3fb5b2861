//! Exit code constants for CLI commands
//!
//! - 0: Success
//! - 1: Process failed, not found, or warnings found
//! - 2: Invalid input, configuration or definitions

/// Successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// Process failed or warnings found
pub const EXIT_WARNING: i32 = 1;

/// Invalid input or critical failures
pub const EXIT_ERROR: i32 = 2;
