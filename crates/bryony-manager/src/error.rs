use thiserror::Error;

/// Errors from manager operations.
///
/// Structural problems never show up here; they come back as
/// [`bryony_workflow::ValidationReport`] data. This type only carries
/// failures of the storage boundary, surfaced unchanged: the manager has no
/// retry policy of its own.
#[derive(Debug, Error)]
pub enum ManagerError {
  #[error(transparent)]
  Store(#[from] bryony_store::Error),
}
