//! Pre-checks for single workflow edits.
//!
//! Each check takes an explicit workflow snapshot and a proposed change, and
//! returns the same report shape as the full validator so callers share one
//! error-handling path. Where an edit can affect the graph shape, the change
//! is simulated on a clone and cycle detection runs on the full resulting
//! graph, never on local adjacency alone: a batch of edits may pass through
//! states where an existing dangling trigger resolves against the new task
//! and closes a loop.

use crate::types::{ROOT_TRIGGER, ValidationReport, Workflow, WorkflowTask};

/// Check whether `task` can be appended to `workflow`.
pub fn can_add_task(workflow: &Workflow, task: &WorkflowTask) -> ValidationReport {
  let mut report = ValidationReport::passing();

  if workflow.has_task(&task.name) {
    report.push_error(format!("a task named '{}' already exists", task.name));
  }

  if task.is_entry_point() {
    if workflow.entry_points().next().is_some() {
      report.push_error(format!(
        "only one entry point is allowed: another task already uses the \"{ROOT_TRIGGER}\" trigger"
      ));
    }
  } else if !workflow.has_task(&task.trigger) {
    report.push_error(format!("trigger '{}' does not exist", task.trigger));
  }

  if report.valid {
    let mut simulated = workflow.clone();
    simulated.tasks.push(task.clone());
    if simulated.graph().has_cycle() {
      report.push_error(format!("adding task '{}' would create a cycle", task.name));
    }
  }

  report
}

/// Check whether the task named `name` can be removed from `workflow`.
///
/// Removal is never blocked outright; tasks still triggered by the removed
/// name are reported as a warning, since they become disconnected and are not
/// re-parented automatically.
pub fn can_remove_task(workflow: &Workflow, name: &str) -> ValidationReport {
  let mut report = ValidationReport::passing();

  if !workflow.has_task(name) {
    report.push_error(format!("task '{name}' does not exist"));
    return report;
  }

  let dependents: Vec<&str> = workflow
    .tasks
    .iter()
    .filter(|t| t.trigger == name)
    .map(|t| t.name.as_str())
    .collect();
  if !dependents.is_empty() {
    report.push_warning(format!(
      "removing '{}' leaves dependent tasks without a trigger: {}",
      name,
      dependents.join(", ")
    ));
  }

  report
}

/// Check whether the task named `name` can switch to `new_trigger`.
pub fn can_change_trigger(workflow: &Workflow, name: &str, new_trigger: &str) -> ValidationReport {
  let mut report = ValidationReport::passing();

  if !workflow.has_task(name) {
    report.push_error(format!("task '{name}' does not exist"));
    return report;
  }
  if new_trigger == name {
    report.push_error(format!("task '{name}' cannot trigger itself"));
  }
  if new_trigger != ROOT_TRIGGER && !workflow.has_task(new_trigger) {
    report.push_error(format!("trigger '{new_trigger}' does not exist"));
  }

  if report.valid {
    let mut simulated = workflow.clone();
    if let Some(task) = simulated.tasks.iter_mut().find(|t| t.name == name) {
      task.trigger = new_trigger.to_string();
    }
    if simulated.graph().has_cycle() {
      report.push_error(format!(
        "changing the trigger of '{name}' to '{new_trigger}' would create a cycle"
      ));
    }
  }

  report
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  fn workflow(tasks: &[(&str, &str)]) -> Workflow {
    let now = Utc::now();
    Workflow {
      id: "wf-1".to_string(),
      name: "scrape docs".to_string(),
      description: None,
      tasks: tasks
        .iter()
        .map(|(name, trigger)| WorkflowTask::new(format!("task-{name}"), *name, *trigger))
        .collect(),
      created_at: now,
      updated_at: now,
    }
  }

  #[test]
  fn test_add_accepts_a_valid_task() {
    let workflow = workflow(&[("crawl", "_run_")]);
    let report = can_add_task(&workflow, &WorkflowTask::new("t2", "shot", "crawl"));
    assert!(report.valid);
  }

  #[test]
  fn test_add_rejects_name_collision() {
    let workflow = workflow(&[("crawl", "_run_")]);
    let report = can_add_task(&workflow, &WorkflowTask::new("t2", "crawl", "crawl"));
    assert!(!report.valid);
    assert!(report.errors.iter().any(|e| e.contains("already exists")));
  }

  #[test]
  fn test_add_rejects_second_entry_point() {
    let workflow = workflow(&[("crawl", "_run_"), ("shot", "crawl")]);
    let report = can_add_task(&workflow, &WorkflowTask::new("t3", "x", "_run_"));
    assert!(!report.valid);
    assert!(
      report
        .errors
        .iter()
        .any(|e| e.contains("only one entry point"))
    );
  }

  #[test]
  fn test_add_rejects_unknown_trigger() {
    let workflow = workflow(&[("crawl", "_run_")]);
    let report = can_add_task(&workflow, &WorkflowTask::new("t2", "shot", "ghost"));
    assert!(!report.valid);
    assert!(report.errors.iter().any(|e| e.contains("does not exist")));
  }

  #[test]
  fn test_add_rejects_cycle_through_dangling_trigger() {
    // "b" already points at the not-yet-added "x". Adding x with trigger "b"
    // resolves that dangling edge and closes the loop b -> x -> b, which only
    // a simulation of the full resulting graph can see.
    let workflow = workflow(&[("crawl", "_run_"), ("b", "x")]);
    let report = can_add_task(&workflow, &WorkflowTask::new("t3", "x", "b"));
    assert!(!report.valid);
    assert!(report.errors.iter().any(|e| e.contains("cycle")));
  }

  #[test]
  fn test_remove_unknown_task_is_an_error() {
    let workflow = workflow(&[("crawl", "_run_")]);
    let report = can_remove_task(&workflow, "ghost");
    assert!(!report.valid);
  }

  #[test]
  fn test_remove_warns_about_dependents() {
    let workflow = workflow(&[("crawl", "_run_"), ("filter", "crawl"), ("shot", "filter")]);
    let report = can_remove_task(&workflow, "filter");
    assert!(report.valid);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("shot"));
  }

  #[test]
  fn test_remove_leaf_is_clean() {
    let workflow = workflow(&[("crawl", "_run_"), ("shot", "crawl")]);
    let report = can_remove_task(&workflow, "shot");
    assert!(report.valid);
    assert!(report.warnings.is_empty());
  }

  #[test]
  fn test_change_trigger_rejects_unknown_task_and_trigger() {
    let workflow = workflow(&[("crawl", "_run_"), ("shot", "crawl")]);
    assert!(!can_change_trigger(&workflow, "ghost", "crawl").valid);
    assert!(!can_change_trigger(&workflow, "shot", "ghost").valid);
  }

  #[test]
  fn test_change_trigger_rejects_self_loop() {
    let workflow = workflow(&[("crawl", "_run_"), ("shot", "crawl")]);
    let report = can_change_trigger(&workflow, "shot", "shot");
    assert!(!report.valid);
    assert!(report.errors.iter().any(|e| e.contains("itself")));
  }

  #[test]
  fn test_change_trigger_rejects_cycle() {
    let workflow = workflow(&[
      ("crawl", "_run_"),
      ("a", "crawl"),
      ("b", "a"),
      ("c", "b"),
    ]);
    // a -> b -> c today; pointing a at c closes a -> b -> c -> a.
    let report = can_change_trigger(&workflow, "a", "c");
    assert!(!report.valid);
    assert!(report.errors.iter().any(|e| e.contains("cycle")));
  }

  #[test]
  fn test_change_trigger_accepts_a_reparent() {
    let workflow = workflow(&[("crawl", "_run_"), ("filter", "crawl"), ("shot", "filter")]);
    let report = can_change_trigger(&workflow, "shot", "crawl");
    assert!(report.valid);
    assert!(report.errors.is_empty());
  }
}
