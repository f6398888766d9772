use bryony_workflow::Workflow;
use serde::Serialize;

/// Statistics derived from a workflow's trigger graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkflowStats {
  pub task_count: usize,
  /// 0 or 1; the builder keeps a single root even on malformed input.
  pub entry_point_count: usize,
  pub leaf_count: usize,
  /// Longest root-rooted trigger chain, counted in tasks.
  pub max_depth: usize,
}

impl WorkflowStats {
  pub fn of(workflow: &Workflow) -> Self {
    let graph = workflow.graph();
    Self {
      task_count: graph.len(),
      entry_point_count: usize::from(graph.root().is_some()),
      leaf_count: graph.leaves().count(),
      max_depth: graph.max_depth(),
    }
  }
}
