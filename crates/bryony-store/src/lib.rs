//! Bryony Store
//!
//! This crate provides the storage gateway for workflow definitions. The
//! [`Store`] trait defines the narrow interface the rest of the system
//! consumes:
//! - Upserting and fetching whole workflow documents
//! - Listing and searching by name or description
//! - Deleting a workflow wholesale, tasks included
//!
//! Two implementations are provided: [`SqliteStore`] persists to a SQLite
//! database, [`MemoryStore`] keeps everything in process for tests and
//! embedded use. The store never validates: a caller decides what may be
//! persisted before handing a document over. Storage failures are surfaced
//! as-is; retry policy belongs to the caller.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use bryony_workflow::Workflow;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// A database error occurred.
  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),
}

/// Storage gateway for workflow definitions.
///
/// Assumed durable and strongly consistent per workflow id. Missing records
/// are `None`/`false` results, not errors.
#[async_trait]
pub trait Store: Send + Sync {
  /// Insert or replace a workflow, keyed on its id.
  async fn save(&self, workflow: &Workflow) -> Result<(), Error>;

  /// Get a workflow by id.
  async fn get(&self, id: &str) -> Result<Option<Workflow>, Error>;

  /// List all workflows, most recently updated first.
  async fn list(&self) -> Result<Vec<Workflow>, Error>;

  /// Case-insensitive substring search over name and description.
  async fn search(&self, query: &str) -> Result<Vec<Workflow>, Error>;

  /// Delete a workflow by id. Returns whether a record existed.
  async fn delete(&self, id: &str) -> Result<bool, Error>;
}
