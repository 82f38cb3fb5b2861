//! # Orchestra
//!
//! A process-orchestration engine driving processes through declarative
//! graphs of named states and conditional transitions.
//!
//! ## Features
//!
//! - **Process Definitions**: Build state graphs once, validated acyclic at construction
//! - **Engine**: Launch, pause and resume runs with failure containment
//! - **Persistence**: In-memory and file-system context stores with merged history
//! - **Actions**: Named action registry and best-effort post-actions
//!
//! ## Quick Start
//!
//! ```rust
//! use orchestra::process::{Engine, MemoryContextStore, Parameters, ProcessDefinition};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let definition = ProcessDefinition::build("example", |p| {
//!     let state1 = p.state("state1")?;
//!     let state2 = p.state("state2")?;
//!     p.then(p.start_state(), state1);
//!     p.then(state1, state2);
//!     Ok(())
//! })?;
//!
//! let engine = Engine::with_store(Arc::new(MemoryContextStore::new()));
//! let process_id = engine.launch(&definition, Parameters::new())?;
//! println!("launched {process_id}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Process graphs, execution contexts, storage and the engine
pub mod process;

/// Configuration loading
pub mod config;

/// Error types used throughout the library
pub mod error;

pub use config::{ConfigError, IdGeneratorKind, OrchestraConfig};
pub use error::{ErrorContext, OrchestraError, Result};
pub use process::{
    ActionRegistry, Engine, EngineError, ExecutionContext, Parameters, ProcessDefinition,
    ProcessId, ProcessStatus,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::process::{
        Action, ActionError, ActionRegistry, ActionResult, AlwaysInvalid, AlwaysValid, Condition,
        ContextFinder, ContextWriter, Engine, ExecutionContext, Parameters, PostAction,
        ProcessDefinition, ProcessId, ProcessStatus, ResumeOutcome,
    };
    pub use crate::{OrchestraConfig, OrchestraError, Result};
}
