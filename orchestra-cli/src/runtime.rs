//! Wiring of configuration, storage and engine for one CLI invocation

use crate::error::CliResult;
use orchestra::process::{
    CompositeContextWriter, ContextWriter, Engine, FileSystemContextStore, LogContextWriter,
};
use orchestra::{ErrorContext, OrchestraConfig, OrchestraError};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Options shared by every subcommand
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub storage_dir: Option<PathBuf>,
}

/// Everything a process command needs
#[derive(Debug)]
pub struct Runtime {
    pub config: OrchestraConfig,
    pub store: Arc<FileSystemContextStore>,
    pub engine: Engine,
}

impl Runtime {
    /// Open the store and build the engine
    pub fn with_config(config: OrchestraConfig) -> CliResult<Self> {
        let store = Arc::new(FileSystemContextStore::new(&config.storage_dir).with_context(|| {
            format!(
                "Failed to open process storage at {}",
                config.storage_dir.display()
            )
        })?);

        let mut writer = CompositeContextWriter::default().with(store.clone());
        if config.log_contexts {
            writer = writer.with(Arc::new(LogContextWriter));
        }
        let writer: Arc<dyn ContextWriter> = Arc::new(writer);

        let engine = Engine::new(writer, store.clone()).with_context_factory(config.context_factory());
        tracing::debug!(storage_dir = %config.storage_dir.display(), "Opened process storage");

        Ok(Self {
            config,
            store,
            engine,
        })
    }
}

/// Resolve configuration from an explicit file, or by searching the usual locations
pub fn load_config(path: Option<&Path>) -> CliResult<OrchestraConfig> {
    let config = match path {
        Some(path) => OrchestraConfig::load_from(Some(path)),
        None => OrchestraConfig::load(),
    }
    .map_err(OrchestraError::from)?;
    Ok(config)
}

impl GlobalOptions {
    /// Open the runtime, letting `--storage-dir` win over every other source
    pub fn open_runtime(&self) -> CliResult<Runtime> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(storage_dir) = &self.storage_dir {
            config.storage_dir = storage_dir.clone();
        }
        Runtime::with_config(config)
    }
}
