use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bryony_workflow::Workflow;

use crate::{Error, Store};

/// In-process store implementation.
///
/// Same contract as the database-backed store without any I/O; used by tests
/// and by embedders that do not need durability.
#[derive(Debug, Default)]
pub struct MemoryStore {
  workflows: RwLock<HashMap<String, Workflow>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

fn by_recency(workflows: &mut Vec<Workflow>) {
  workflows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

#[async_trait]
impl Store for MemoryStore {
  async fn save(&self, workflow: &Workflow) -> Result<(), Error> {
    let mut workflows = self.workflows.write().expect("store lock poisoned");
    workflows.insert(workflow.id.clone(), workflow.clone());
    Ok(())
  }

  async fn get(&self, id: &str) -> Result<Option<Workflow>, Error> {
    let workflows = self.workflows.read().expect("store lock poisoned");
    Ok(workflows.get(id).cloned())
  }

  async fn list(&self) -> Result<Vec<Workflow>, Error> {
    let workflows = self.workflows.read().expect("store lock poisoned");
    let mut all: Vec<Workflow> = workflows.values().cloned().collect();
    by_recency(&mut all);
    Ok(all)
  }

  async fn search(&self, query: &str) -> Result<Vec<Workflow>, Error> {
    let needle = query.to_lowercase();
    let workflows = self.workflows.read().expect("store lock poisoned");
    let mut hits: Vec<Workflow> = workflows
      .values()
      .filter(|w| {
        w.name.to_lowercase().contains(&needle)
          || w
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
      })
      .cloned()
      .collect();
    by_recency(&mut hits);
    Ok(hits)
  }

  async fn delete(&self, id: &str) -> Result<bool, Error> {
    let mut workflows = self.workflows.write().expect("store lock poisoned");
    Ok(workflows.remove(id).is_some())
  }
}
