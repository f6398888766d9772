use thiserror::Error;

/// Errors for direct graph and task lookups.
///
/// Structural problems are never reported through this type; the validator
/// and the mutation guards return them as [`crate::ValidationReport`] data.
#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("task not found: {0}")]
  TaskNotFound(String),
}
