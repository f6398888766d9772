use bryony_store::Store;
use bryony_workflow::{
  ValidationReport, Workflow, WorkflowTask, can_add_task, can_change_trigger, can_remove_task,
  validate,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::error::ManagerError;
use crate::stats::WorkflowStats;

/// Orchestrates workflow definitions over a storage gateway.
///
/// Every write path revalidates the whole document: incremental edits pass
/// the mutation guard first, but the guard result is never trusted on its
/// own. Either the full edit (graph rebuild + persist) commits, or nothing
/// changes.
pub struct WorkflowManager<S: Store> {
  store: S,
}

impl<S: Store> WorkflowManager<S> {
  pub fn new(store: S) -> Self {
    Self { store }
  }

  /// Create an empty workflow with a fresh identifier and timestamps.
  ///
  /// The shell is not persisted: an empty workflow cannot pass validation,
  /// and every persist path runs through [`save_workflow`](Self::save_workflow).
  pub fn create_workflow(&self, name: impl Into<String>, description: Option<String>) -> Workflow {
    let workflow = Workflow::new(name, description);
    info!(workflow_id = %workflow.id, name = %workflow.name, "workflow created");
    workflow
  }

  /// Validate and persist a workflow.
  ///
  /// On errors the document is not written and the report carries the full
  /// problem set; on success `updated_at` is bumped before the store upsert.
  pub async fn save_workflow(
    &self,
    workflow: &mut Workflow,
  ) -> Result<ValidationReport, ManagerError> {
    let report = validate(workflow);
    if !report.valid {
      warn!(
        workflow_id = %workflow.id,
        errors = ?report.errors,
        "refusing to persist invalid workflow"
      );
      return Ok(report);
    }

    workflow.updated_at = Utc::now();
    self.store.save(workflow).await?;
    info!(
      workflow_id = %workflow.id,
      task_count = workflow.tasks.len(),
      "workflow persisted"
    );
    Ok(report)
  }

  pub async fn get_workflow(&self, id: &str) -> Result<Option<Workflow>, ManagerError> {
    Ok(self.store.get(id).await?)
  }

  pub async fn list_workflows(&self) -> Result<Vec<Workflow>, ManagerError> {
    Ok(self.store.list().await?)
  }

  pub async fn search_workflows(&self, query: &str) -> Result<Vec<Workflow>, ManagerError> {
    Ok(self.store.search(query).await?)
  }

  pub async fn delete_workflow(&self, id: &str) -> Result<bool, ManagerError> {
    let deleted = self.store.delete(id).await?;
    if deleted {
      info!(workflow_id = %id, "workflow deleted");
    }
    Ok(deleted)
  }

  /// Guarded append of a task, committed only if the whole document still
  /// validates.
  pub async fn add_task(
    &self,
    workflow: &mut Workflow,
    task: WorkflowTask,
  ) -> Result<ValidationReport, ManagerError> {
    let guard = can_add_task(workflow, &task);
    if !guard.valid {
      warn!(
        workflow_id = %workflow.id,
        task = %task.name,
        errors = ?guard.errors,
        "add rejected by mutation guard"
      );
      return Ok(guard);
    }

    let mut candidate = workflow.clone();
    candidate.tasks.push(task);
    self.commit(workflow, candidate, guard).await
  }

  /// Guarded removal of the task named `name`.
  ///
  /// The guard never blocks a removal, but the full revalidation will refuse
  /// to persist a document whose remaining tasks now reference a missing
  /// trigger; the caller gets those errors plus the guard's warnings.
  pub async fn remove_task(
    &self,
    workflow: &mut Workflow,
    name: &str,
  ) -> Result<ValidationReport, ManagerError> {
    let guard = can_remove_task(workflow, name);
    if !guard.valid {
      warn!(
        workflow_id = %workflow.id,
        task = %name,
        errors = ?guard.errors,
        "remove rejected by mutation guard"
      );
      return Ok(guard);
    }

    let mut candidate = workflow.clone();
    candidate.tasks.retain(|t| t.name != name);
    self.commit(workflow, candidate, guard).await
  }

  /// Guarded trigger change for the task named `name`.
  pub async fn update_task_trigger(
    &self,
    workflow: &mut Workflow,
    name: &str,
    new_trigger: &str,
  ) -> Result<ValidationReport, ManagerError> {
    let guard = can_change_trigger(workflow, name, new_trigger);
    if !guard.valid {
      warn!(
        workflow_id = %workflow.id,
        task = %name,
        errors = ?guard.errors,
        "trigger change rejected by mutation guard"
      );
      return Ok(guard);
    }

    let mut candidate = workflow.clone();
    if let Some(task) = candidate.tasks.iter_mut().find(|t| t.name == name) {
      task.trigger = new_trigger.to_string();
    }
    self.commit(workflow, candidate, guard).await
  }

  /// Replace the opaque config payload of the task named `name`.
  ///
  /// Config is never interpreted here, so no graph simulation is needed; the
  /// document is still revalidated as a whole before the write.
  pub async fn update_task_config(
    &self,
    workflow: &mut Workflow,
    name: &str,
    config: serde_json::Value,
  ) -> Result<ValidationReport, ManagerError> {
    if !workflow.has_task(name) {
      let mut report = ValidationReport::passing();
      report.push_error(format!("task '{name}' does not exist"));
      return Ok(report);
    }

    let mut candidate = workflow.clone();
    if let Some(task) = candidate.tasks.iter_mut().find(|t| t.name == name) {
      task.config = config;
    }
    self.commit(workflow, candidate, ValidationReport::passing()).await
  }

  /// Copy a stored workflow's tasks under a fresh identifier and name.
  ///
  /// Returns `None` when the source does not exist. The clone validates
  /// independently and is persisted through the normal save path.
  pub async fn clone_workflow(
    &self,
    id: &str,
    new_name: &str,
  ) -> Result<Option<Workflow>, ManagerError> {
    let Some(source) = self.store.get(id).await? else {
      return Ok(None);
    };

    let mut clone = Workflow::new(new_name, source.description.clone());
    clone.tasks = source.tasks.clone();
    let report = self.save_workflow(&mut clone).await?;
    if report.valid {
      info!(source_id = %id, clone_id = %clone.id, "workflow cloned");
    }
    Ok(Some(clone))
  }

  /// Run the structural validator without persisting anything.
  pub fn validate_workflow(&self, workflow: &Workflow) -> ValidationReport {
    validate(workflow)
  }

  /// Derive statistics from the workflow's trigger graph.
  pub fn workflow_stats(&self, workflow: &Workflow) -> WorkflowStats {
    WorkflowStats::of(workflow)
  }

  /// Validate and persist `candidate`; commit it into the caller's snapshot
  /// only on success, and carry the guard's warnings either way.
  async fn commit(
    &self,
    workflow: &mut Workflow,
    mut candidate: Workflow,
    guard: ValidationReport,
  ) -> Result<ValidationReport, ManagerError> {
    let mut report = self.save_workflow(&mut candidate).await?;
    if report.valid {
      *workflow = candidate;
    }

    let mut warnings = guard.warnings;
    warnings.append(&mut report.warnings);
    report.warnings = warnings;
    Ok(report)
  }
}
