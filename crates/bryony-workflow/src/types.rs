use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::graph::WorkflowGraph;

/// Reserved trigger marking a task as the workflow entry point.
///
/// The literal is part of the durable format and must match existing stored
/// workflows exactly.
pub const ROOT_TRIGGER: &str = "_run_";

/// A single step of a workflow.
///
/// `trigger` is either [`ROOT_TRIGGER`] or the `name` of another task in the
/// same workflow; it defines the directed edge trigger -> task. `config` is
/// an opaque payload owned by the executing task and is never interpreted
/// here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTask {
  /// Reference to the task definition in the registry. Opaque.
  pub task_id: String,
  /// Unique within the owning workflow.
  pub name: String,
  pub trigger: String,
  #[serde(default)]
  pub config: serde_json::Value,
}

impl WorkflowTask {
  pub fn new(
    task_id: impl Into<String>,
    name: impl Into<String>,
    trigger: impl Into<String>,
  ) -> Self {
    Self {
      task_id: task_id.into(),
      name: name.into(),
      trigger: trigger.into(),
      config: serde_json::Value::Null,
    }
  }

  /// Whether this task claims the entry-point trigger.
  pub fn is_entry_point(&self) -> bool {
    self.trigger == ROOT_TRIGGER
  }
}

/// A named, owned collection of tasks connected by trigger relationships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
  pub id: String,
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub tasks: Vec<WorkflowTask>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Workflow {
  /// Create an empty workflow with a fresh identifier and timestamps.
  ///
  /// The result is not yet valid: a workflow must contain at least one task
  /// before it passes [`crate::validate`].
  pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
    let now = Utc::now();
    Self {
      id: uuid::Uuid::new_v4().to_string(),
      name: name.into(),
      description,
      tasks: Vec::new(),
      created_at: now,
      updated_at: now,
    }
  }

  /// Look up a task by name.
  pub fn task(&self, name: &str) -> Option<&WorkflowTask> {
    self.tasks.iter().find(|t| t.name == name)
  }

  pub fn has_task(&self, name: &str) -> bool {
    self.task(name).is_some()
  }

  /// Tasks claiming the entry-point trigger. A valid workflow has exactly one.
  pub fn entry_points(&self) -> impl Iterator<Item = &WorkflowTask> {
    self.tasks.iter().filter(|t| t.is_entry_point())
  }

  /// Build the trigger graph for traversal and analysis.
  pub fn graph(&self) -> WorkflowGraph {
    WorkflowGraph::build(self)
  }
}

/// Outcome of a validation or mutation-guard check.
///
/// Problems are returned as data, never raised: `errors` block persistence,
/// `warnings` never do.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
  pub valid: bool,
  pub errors: Vec<String>,
  pub warnings: Vec<String>,
}

impl ValidationReport {
  /// A passing report with no findings.
  pub fn passing() -> Self {
    Self {
      valid: true,
      errors: Vec::new(),
      warnings: Vec::new(),
    }
  }

  pub fn push_error(&mut self, message: impl Into<String>) {
    self.errors.push(message.into());
    self.valid = false;
  }

  pub fn push_warning(&mut self, message: impl Into<String>) {
    self.warnings.push(message.into());
  }
}
