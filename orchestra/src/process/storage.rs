//! Persistence of execution contexts
//!
//! Every backend stores one [`ContextReadModel`] row per process id. Saving a
//! context is an upsert: a new id inserts a row, a known id replaces status,
//! last state, failure and parameters and appends the context's executed
//! transitions to the history already stored. The creation time is kept.

use crate::process::{ContextReadModel, ExecutionContext, ProcessId};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by context storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO error while reading or writing a row
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A row could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// A stored row does not belong to the id it was stored under
    #[error("Corrupt row for process '{process_id}': {reason}")]
    Corrupt {
        /// Id the row was looked up by
        process_id: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Read side of the persistence contract
pub trait ContextFinder: Send + Sync {
    /// Read model of a process, `None` if it was never saved
    fn find_by_process_id(&self, process_id: &ProcessId) -> StorageResult<Option<ContextReadModel>>;

    /// Every stored process, oldest first
    fn find_all(&self) -> StorageResult<Vec<ContextReadModel>>;
}

/// Write side of the persistence contract
pub trait ContextWriter: Send + Sync {
    /// Insert or merge the context's row
    fn save(&self, context: &ExecutionContext) -> StorageResult<()>;
}

/// Merge a context into the row already stored for it, if any
pub fn merge_row(existing: Option<ContextReadModel>, context: &ExecutionContext) -> ContextReadModel {
    let (created_at, mut executed_transitions) = match existing {
        Some(row) => (row.created_at, row.executed_transitions),
        None => (context.created_at(), Vec::new()),
    };
    executed_transitions.extend(context.executed_transitions().iter().cloned());

    ContextReadModel {
        process_id: context.process_id().clone(),
        status: context.status(),
        last_state_name: context
            .last_state_name()
            .map(|name| name.to_string())
            .unwrap_or_default(),
        executed_transitions,
        created_at,
        parameters: context.parameters().clone(),
        failure: context.failure_report(),
    }
}

fn sort_oldest_first(rows: &mut [ContextReadModel]) {
    rows.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.process_id.cmp(&b.process_id))
    });
}

/// In-memory context storage
#[derive(Debug, Default, Clone)]
pub struct MemoryContextStore {
    rows: Arc<dashmap::DashMap<ProcessId, ContextReadModel>>,
}

impl MemoryContextStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether nothing has been saved yet
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Store a row as is, replacing any previous one
    pub fn insert(&self, row: ContextReadModel) {
        self.rows.insert(row.process_id.clone(), row);
    }
}

impl ContextFinder for MemoryContextStore {
    fn find_by_process_id(&self, process_id: &ProcessId) -> StorageResult<Option<ContextReadModel>> {
        Ok(self.rows.get(process_id).map(|row| row.value().clone()))
    }

    fn find_all(&self) -> StorageResult<Vec<ContextReadModel>> {
        let mut rows: Vec<ContextReadModel> =
            self.rows.iter().map(|entry| entry.value().clone()).collect();
        sort_oldest_first(&mut rows);
        Ok(rows)
    }
}

impl ContextWriter for MemoryContextStore {
    fn save(&self, context: &ExecutionContext) -> StorageResult<()> {
        let existing = self.rows.get(context.process_id()).map(|row| row.value().clone());
        let row = merge_row(existing, context);
        self.rows.insert(row.process_id.clone(), row);
        Ok(())
    }
}

/// File system context storage, one JSON file per process
pub struct FileSystemContextStore {
    base_path: PathBuf,
    cache: dashmap::DashMap<ProcessId, ContextReadModel>,
}

impl FileSystemContextStore {
    /// Open (creating if needed) a store rooted at `base_path`
    pub fn new(base_path: impl AsRef<Path>) -> StorageResult<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(base_path.join("processes"))?;

        let store = Self {
            base_path,
            cache: dashmap::DashMap::new(),
        };
        store.reload_cache()?;
        Ok(store)
    }

    /// Root directory of the store
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Reload the cache from disk
    pub fn reload_cache(&self) -> StorageResult<()> {
        self.cache.clear();

        for entry in std::fs::read_dir(self.base_path.join("processes"))? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match Self::read_row(&path) {
                Ok(row) => {
                    self.cache.insert(row.process_id.clone(), row);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable process row");
                }
            }
        }

        tracing::debug!(rows = self.cache.len(), path = %self.base_path.display(), "Loaded process rows");
        Ok(())
    }

    fn read_row(path: &Path) -> StorageResult<ContextReadModel> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Ids end up in file names, so anything that could escape the directory is rejected
    fn row_path(&self, process_id: &ProcessId) -> Option<PathBuf> {
        let id = process_id.as_str();
        let safe = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        safe.then(|| self.base_path.join("processes").join(format!("{id}.json")))
    }
}

impl ContextFinder for FileSystemContextStore {
    fn find_by_process_id(&self, process_id: &ProcessId) -> StorageResult<Option<ContextReadModel>> {
        if let Some(row) = self.cache.get(process_id) {
            return Ok(Some(row.value().clone()));
        }

        let Some(path) = self.row_path(process_id) else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }

        let row = Self::read_row(&path)?;
        if &row.process_id != process_id {
            return Err(StorageError::Corrupt {
                process_id: process_id.to_string(),
                reason: format!("row belongs to '{}'", row.process_id),
            });
        }
        self.cache.insert(process_id.clone(), row.clone());
        Ok(Some(row))
    }

    fn find_all(&self) -> StorageResult<Vec<ContextReadModel>> {
        let mut rows: Vec<ContextReadModel> =
            self.cache.iter().map(|entry| entry.value().clone()).collect();
        sort_oldest_first(&mut rows);
        Ok(rows)
    }
}

impl ContextWriter for FileSystemContextStore {
    fn save(&self, context: &ExecutionContext) -> StorageResult<()> {
        let path = self
            .row_path(context.process_id())
            .ok_or_else(|| StorageError::Corrupt {
                process_id: context.process_id().to_string(),
                reason: "process id is not usable as a file name".to_string(),
            })?;

        let existing = self.find_by_process_id(context.process_id())?;
        let row = merge_row(existing, context);
        std::fs::write(&path, serde_json::to_string_pretty(&row)?)?;
        self.cache.insert(row.process_id.clone(), row);
        Ok(())
    }
}

impl std::fmt::Debug for FileSystemContextStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSystemContextStore")
            .field("base_path", &self.base_path)
            .field("rows", &self.cache.len())
            .finish()
    }
}

/// Writer that only logs the saved context
#[derive(Debug, Default, Clone, Copy)]
pub struct LogContextWriter;

impl ContextWriter for LogContextWriter {
    fn save(&self, context: &ExecutionContext) -> StorageResult<()> {
        let history: Vec<String> = context
            .executed_transitions()
            .iter()
            .map(|executed| executed.transition.to_string())
            .collect();
        let failure = context.failure_report().unwrap_or_default();
        tracing::info!(
            process_id = %context.process_id(),
            status = %context.status(),
            last_state = context.last_state_name().map(|n| n.as_str()).unwrap_or_default(),
            transitions = ?history,
            failure = %failure,
            "Saved process execution context"
        );
        Ok(())
    }
}

/// Writer forwarding to several writers in order, stopping at the first error
#[derive(Clone, Default)]
pub struct CompositeContextWriter {
    writers: Vec<Arc<dyn ContextWriter>>,
}

impl CompositeContextWriter {
    /// Composite of the given writers
    pub fn new(writers: Vec<Arc<dyn ContextWriter>>) -> Self {
        Self { writers }
    }

    /// Append a writer
    pub fn with(mut self, writer: Arc<dyn ContextWriter>) -> Self {
        self.writers.push(writer);
        self
    }
}

impl ContextWriter for CompositeContextWriter {
    fn save(&self, context: &ExecutionContext) -> StorageResult<()> {
        for writer in &self.writers {
            writer.save(context)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for CompositeContextWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeContextWriter")
            .field("writers", &self.writers.len())
            .finish()
    }
}
