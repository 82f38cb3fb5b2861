//! Orchestra CLI Library
//!
//! Command-line definitions, bundled process definitions and the command
//! implementations behind the `orchestra` binary.

/// Command-line interface definitions and argument parsing
pub mod cli;
/// Process definitions bundled with the binary
pub mod definitions;
/// Error type carrying an exit code
pub mod error;
/// Exit codes used by the CLI application
pub mod exit_codes;
/// Listing of bundled definitions
pub mod list;
/// Logging setup
pub mod logging;
/// Launch, resume, status and list commands
pub mod process;
/// Configuration, storage and engine wiring
pub mod runtime;
/// Validation of bundled definitions
pub mod validate;
