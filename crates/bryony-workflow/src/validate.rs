use std::collections::HashSet;

use crate::graph::WorkflowGraph;
use crate::types::{ROOT_TRIGGER, ValidationReport, Workflow};

/// Validate a workflow's structure.
///
/// Checks run in a fixed order and accumulate every applicable error so the
/// caller sees the complete problem set in one pass:
/// 1. workflow name non-empty; a task-less workflow is a terminal error and
///    skips all further checks
/// 2. task names non-empty; duplicates reported as one aggregated error
/// 3. exactly one entry point
/// 4. triggers non-empty, resolvable, and never a task's own name
/// 5. only when 1-4 found nothing: no cycles, everything reachable from the
///    entry point
///
/// Isolated tasks (no parent, no child, not the entry point) are reported as
/// warnings; warnings never block a save. This function never panics and
/// never short-circuits on the first error.
pub fn validate(workflow: &Workflow) -> ValidationReport {
  let mut report = ValidationReport::passing();

  if workflow.name.trim().is_empty() {
    report.push_error("workflow name must not be empty");
  }
  if workflow.tasks.is_empty() {
    report.push_error("workflow must contain at least one task");
    return report;
  }

  check_task_names(workflow, &mut report);
  check_entry_points(workflow, &mut report);
  check_triggers(workflow, &mut report);

  let graph = workflow.graph();
  if report.errors.is_empty() {
    check_graph(&graph, &mut report);
  }
  warn_isolated(&graph, &mut report);

  report
}

fn check_task_names(workflow: &Workflow, report: &mut ValidationReport) {
  let mut seen = HashSet::new();
  let mut duplicates: Vec<&str> = Vec::new();

  for (position, task) in workflow.tasks.iter().enumerate() {
    if task.name.trim().is_empty() {
      report.push_error(format!("task #{} has an empty name", position + 1));
      continue;
    }
    if !seen.insert(task.name.as_str()) && !duplicates.contains(&task.name.as_str()) {
      duplicates.push(task.name.as_str());
    }
  }

  if !duplicates.is_empty() {
    report.push_error(format!("duplicate task names: {}", duplicates.join(", ")));
  }
}

fn check_entry_points(workflow: &Workflow, report: &mut ValidationReport) {
  let count = workflow.entry_points().count();
  match count {
    0 => report.push_error(format!(
      "no entry point: exactly one task must use the \"{ROOT_TRIGGER}\" trigger"
    )),
    1 => {}
    n => report.push_error(format!(
      "multiple entry points: {n} tasks use the \"{ROOT_TRIGGER}\" trigger"
    )),
  }
}

fn check_triggers(workflow: &Workflow, report: &mut ValidationReport) {
  for task in &workflow.tasks {
    if task.trigger.trim().is_empty() {
      report.push_error(format!("task '{}' has an empty trigger", task.name));
    } else if task.trigger == task.name {
      report.push_error(format!("task '{}' triggers itself", task.name));
    } else if !task.is_entry_point() && !workflow.has_task(&task.trigger) {
      report.push_error(format!(
        "task '{}' references unknown trigger '{}'",
        task.name, task.trigger
      ));
    }
  }
}

fn check_graph(graph: &WorkflowGraph, report: &mut ValidationReport) {
  if graph.has_cycle() {
    report.push_error("cycle detected in the trigger graph");
  }
  let unreachable = graph.unreachable_from_root();
  if !unreachable.is_empty() {
    report.push_error(format!(
      "tasks unreachable from the entry point: {}",
      unreachable.join(", ")
    ));
  }
}

fn warn_isolated(graph: &WorkflowGraph, report: &mut ValidationReport) {
  let root_name = graph.root().map(|n| n.name.clone());
  for node in graph.nodes() {
    if Some(&node.name) == root_name.as_ref() {
      continue;
    }
    if node.parents.is_empty() && node.children.is_empty() {
      report.push_warning(format!(
        "task '{}' is isolated: nothing triggers it and it triggers nothing",
        node.name
      ));
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::WorkflowTask;
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
  fn test_valid_chain() {
    let report = validate(&workflow(&[
      ("crawl", "_run_"),
      ("filter", "crawl"),
      ("shot", "filter"),
    ]));
    assert!(report.valid, "unexpected errors: {:?}", report.errors);
    assert!(report.errors.is_empty());
    assert!(report.warnings.is_empty());
  }

  #[test]
  fn test_empty_workflow_short_circuits() {
    let report = validate(&workflow(&[]));
    assert!(!report.valid);
    assert_eq!(report.errors, vec!["workflow must contain at least one task"]);
  }

  #[test]
  fn test_empty_workflow_name_is_reported_before_short_circuit() {
    let mut workflow = workflow(&[]);
    workflow.name = "  ".to_string();
    let report = validate(&workflow);
    assert_eq!(report.errors.len(), 2);
    assert!(report.errors[0].contains("workflow name"));
  }

  #[test]
  fn test_duplicate_names_aggregated_into_one_error() {
    let report = validate(&workflow(&[
      ("crawl", "_run_"),
      ("shot", "crawl"),
      ("shot", "crawl"),
      ("pdf", "crawl"),
      ("pdf", "crawl"),
      ("pdf", "crawl"),
    ]));
    let duplicate_errors: Vec<&String> = report
      .errors
      .iter()
      .filter(|e| e.contains("duplicate"))
      .collect();
    assert_eq!(duplicate_errors.len(), 1);
    assert!(duplicate_errors[0].contains("shot"));
    assert!(duplicate_errors[0].contains("pdf"));
  }

  #[test]
  fn test_empty_task_name() {
    let report = validate(&workflow(&[("crawl", "_run_"), ("", "crawl")]));
    assert!(!report.valid);
    assert!(report.errors.iter().any(|e| e.contains("empty name")));
  }

  #[test]
  fn test_no_entry_point_reported_before_graph_checks() {
    // Two tasks triggering each other, neither claiming "_run_": the entry
    // point error fires and the cycle check never runs.
    let report = validate(&workflow(&[("a", "b"), ("b", "a")]));
    assert!(!report.valid);
    assert!(report.errors.iter().any(|e| e.contains("no entry point")));
    assert!(!report.errors.iter().any(|e| e.contains("cycle")));
  }

  #[test]
  fn test_multiple_entry_points_report_count() {
    let report = validate(&workflow(&[
      ("a", "_run_"),
      ("b", "_run_"),
      ("c", "a"),
    ]));
    assert!(!report.valid);
    assert!(
      report
        .errors
        .iter()
        .any(|e| e.contains("multiple entry points") && e.contains('2'))
    );
  }

  #[test]
  fn test_unknown_trigger_names_task_and_trigger() {
    let report = validate(&workflow(&[("crawl", "_run_"), ("shot", "ghost")]));
    assert!(!report.valid);
    assert!(
      report
        .errors
        .iter()
        .any(|e| e.contains("shot") && e.contains("ghost"))
    );
  }

  #[test]
  fn test_self_loop_is_a_distinct_error() {
    let report = validate(&workflow(&[("crawl", "_run_"), ("shot", "shot")]));
    assert!(!report.valid);
    assert!(report.errors.iter().any(|e| e.contains("triggers itself")));
  }

  #[test]
  fn test_empty_trigger() {
    let report = validate(&workflow(&[("crawl", "_run_"), ("shot", " ")]));
    assert!(!report.valid);
    assert!(report.errors.iter().any(|e| e.contains("empty trigger")));
  }

  #[test]
  fn test_cycle_and_unreachable_reported_together() {
    // Steps 1-4 are clean: one root, all triggers resolve, no self loops.
    // The b -> c -> d -> b loop is both cyclic and unreachable from crawl.
    let report = validate(&workflow(&[
      ("crawl", "_run_"),
      ("b", "d"),
      ("c", "b"),
      ("d", "c"),
    ]));
    assert!(!report.valid);
    assert!(report.errors.iter().any(|e| e.contains("cycle")));
    assert!(
      report
        .errors
        .iter()
        .any(|e| e.contains("unreachable") && e.contains('b'))
    );
  }

  #[test]
  fn test_graph_checks_skipped_when_reference_errors_exist() {
    let report = validate(&workflow(&[("crawl", "_run_"), ("shot", "ghost")]));
    // "shot" is unreachable too, but step 5 must not run on a document that
    // already failed reference checks.
    assert!(!report.errors.iter().any(|e| e.contains("unreachable")));
  }

  #[test]
  fn test_isolated_task_is_a_warning_not_an_error() {
    let report = validate(&workflow(&[("crawl", "_run_"), ("shot", "ghost")]));
    assert!(
      report
        .warnings
        .iter()
        .any(|w| w.contains("shot") && w.contains("isolated"))
    );
    // The warning accompanies the unknown-trigger error; it never replaces it.
    assert!(!report.valid);
  }

  #[test]
  fn test_root_is_never_warned_isolated() {
    let report = validate(&workflow(&[("crawl", "_run_")]));
    assert!(report.valid);
    assert!(report.warnings.is_empty());
  }

  #[test]
  fn test_validate_is_idempotent() {
    let workflow = workflow(&[("crawl", "_run_"), ("b", "d"), ("c", "b"), ("d", "c")]);
    assert_eq!(validate(&workflow), validate(&workflow));
  }
}
